use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use mu_tracker_core::hashing::secret_matches;
use mu_tracker_core::refresh::RefreshSettings;

/// Shared secret guarding the cron trigger and the log viewer.
///
/// `Debug` never prints the value.
#[derive(Clone)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Constant-time comparison against a caller-supplied key.
    pub fn matches(&self, provided: &str) -> bool {
        secret_matches(provided, &self.0)
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(***)")
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the
/// shared secret: without `CRON_KEY` every trigger request is rejected.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds. Must exceed the refresh deadline.
    pub request_timeout_secs: u64,
    pub cron_key: Option<SharedSecret>,
    /// Pacing and deadline for refresh passes.
    pub refresh: RefreshSettings,
    /// Per-request timeout for fetching a character page.
    pub fetch_timeout_secs: u64,
    /// Run passes in-process every N seconds. `None` leaves scheduling to cron.
    pub auto_refresh_interval_secs: Option<u64>,
    /// File the service also logs to, and the log viewer's first choice.
    pub log_file: Option<PathBuf>,
    /// Extra files the installation check expects to be readable.
    pub install_check_files: Vec<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `HOST`                       | `0.0.0.0`               |
    /// | `PORT`                       | `3000`                  |
    /// | `CORS_ORIGINS`               | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`       | `330`                   |
    /// | `CRON_KEY`                   | unset                   |
    /// | `REFRESH_PACING_MS`          | `500`                   |
    /// | `REFRESH_DEADLINE_SECS`      | `300`                   |
    /// | `REFRESH_FETCH_TIMEOUT_SECS` | `30`                    |
    /// | `AUTO_REFRESH_INTERVAL_SECS` | unset                   |
    /// | `LOG_FILE`                   | unset                   |
    /// | `INSTALL_CHECK_FILES`        | empty                   |
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Panics on malformed numeric values, and on a request timeout that
    /// would cut off a refresh pass before its own deadline, so
    /// misconfiguration fails at startup rather than on the first request.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let parse_u64 = |key: &str, default: u64| -> u64 {
            non_empty(key)
                .map(|v| {
                    v.parse()
                        .unwrap_or_else(|_| panic!("{key} must be a valid u64"))
                })
                .unwrap_or(default)
        };

        let host = non_empty("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port: u16 = non_empty("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = split_list(&non_empty("CORS_ORIGINS").unwrap_or_else(|| "http://localhost:5173".into()));

        let refresh = RefreshSettings {
            pacing: Duration::from_millis(parse_u64("REFRESH_PACING_MS", 500)),
            deadline: Duration::from_secs(parse_u64("REFRESH_DEADLINE_SECS", 300)),
        };

        let request_timeout_secs = parse_u64("REQUEST_TIMEOUT_SECS", 330);
        assert!(
            request_timeout_secs > refresh.deadline.as_secs(),
            "REQUEST_TIMEOUT_SECS ({request_timeout_secs}) must exceed REFRESH_DEADLINE_SECS ({})",
            refresh.deadline.as_secs()
        );

        let install_check_files = non_empty("INSTALL_CHECK_FILES")
            .map(|v| split_list(&v).into_iter().map(PathBuf::from).collect())
            .unwrap_or_default();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            cron_key: non_empty("CRON_KEY").map(SharedSecret::new),
            refresh,
            fetch_timeout_secs: parse_u64("REFRESH_FETCH_TIMEOUT_SECS", 30),
            auto_refresh_interval_secs: non_empty("AUTO_REFRESH_INTERVAL_SECS")
                .map(|_| parse_u64("AUTO_REFRESH_INTERVAL_SECS", 0))
                .filter(|secs| *secs > 0),
            log_file: non_empty("LOG_FILE").map(PathBuf::from),
            install_check_files,
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
