//! Installation health report.
//!
//! Individual probes live with whatever they probe (database, config, file
//! system); this module only defines the report shape and how check results
//! roll up into an overall status.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};

/// Status of one check, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckResult {
    pub fn ok(value: impl Into<Value>) -> Self {
        Self {
            status: CheckStatus::Ok,
            value: value.into(),
            message: None,
        }
    }

    pub fn warning(value: impl Into<Value>, message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Warning,
            value: value.into(),
            message: Some(message.into()),
        }
    }

    pub fn error(value: impl Into<Value>, message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Error,
            value: value.into(),
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: CheckStatus,
    pub checks: BTreeMap<String, CheckResult>,
    pub summary: String,
}

impl HealthReport {
    /// Roll individual checks up into a report. The overall status is the
    /// worst individual status; no checks at all counts as `ok`.
    pub fn from_checks<I, K>(checks: I) -> Self
    where
        I: IntoIterator<Item = (K, CheckResult)>,
        K: Into<String>,
    {
        let checks: BTreeMap<String, CheckResult> =
            checks.into_iter().map(|(k, v)| (k.into(), v)).collect();

        let status = checks
            .values()
            .map(|c| c.status)
            .max()
            .unwrap_or(CheckStatus::Ok);

        let count = |s: CheckStatus| checks.values().filter(|c| c.status == s).count();
        let summary = format!(
            "{} passed, {} warnings, {} errors",
            count(CheckStatus::Ok),
            count(CheckStatus::Warning),
            count(CheckStatus::Error)
        );

        Self {
            status,
            checks,
            summary,
        }
    }
}

/// Expected tables absent from `present`, in `expected` order.
pub fn missing_tables<'a>(expected: &[&'a str], present: &[String]) -> Vec<&'a str> {
    expected
        .iter()
        .copied()
        .filter(|t| !present.iter().any(|p| p == t))
        .collect()
}

/// Check that every listed file exists and can be opened for reading.
pub fn check_files_readable<P: AsRef<Path>>(paths: &[P]) -> CheckResult {
    if paths.is_empty() {
        return CheckResult::ok(json!([]));
    }

    let mut unreadable = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if let Err(e) = File::open(path) {
            unreadable.push(format!("{}: {e}", path.display()));
        }
    }

    let listed: Vec<String> = paths
        .iter()
        .map(|p| p.as_ref().display().to_string())
        .collect();

    if unreadable.is_empty() {
        CheckResult::ok(json!(listed))
    } else {
        CheckResult::warning(json!(listed), format!("Unreadable: {}", unreadable.join("; ")))
    }
}
