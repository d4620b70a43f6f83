//! Reading the tail of the service log for the diagnostics endpoint.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Lines shown when the caller does not ask for a count.
pub const DEFAULT_LINES: usize = 100;

/// Upper bound on lines returned in one request.
pub const MAX_LINES: usize = 1000;

/// Locations searched when no log file is configured.
pub const CANDIDATE_PATHS: &[&str] = &[
    "logs/mu-tracker.log",
    "mu-tracker.log",
    "/var/log/mu-tracker/mu-tracker.log",
];

const CHUNK_SIZE: u64 = 8 * 1024;

/// The last lines of a log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTail {
    pub path: PathBuf,
    pub lines: Vec<String>,
}

impl LogTail {
    /// Plain-text rendering with a header naming the file.
    pub fn render(&self) -> String {
        let mut out = format!(
            "==> {} (last {} lines) <==\n",
            self.path.display(),
            self.lines.len()
        );
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Clamp a requested line count to `1..=MAX_LINES`.
pub fn clamp_lines(requested: Option<usize>) -> usize {
    requested.unwrap_or(DEFAULT_LINES).clamp(1, MAX_LINES)
}

/// Pick the log file to show: the configured one if it exists, otherwise
/// the first existing candidate.
pub fn discover<P: AsRef<Path>>(configured: Option<&Path>, candidates: &[P]) -> Option<PathBuf> {
    configured
        .into_iter()
        .chain(candidates.iter().map(|p| p.as_ref()))
        .find(|p| p.is_file())
        .map(Path::to_path_buf)
}

/// Read the last `n` lines of `path`.
///
/// Reads backwards in fixed-size chunks so large logs are not loaded whole.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn tail(path: &Path, n: usize) -> io::Result<LogTail> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();

    let mut pos = len;
    let mut buf: Vec<u8> = Vec::new();

    // One extra newline is needed when the file ends with one.
    while pos > 0 && bytecount_newlines(&buf) <= n {
        let read = CHUNK_SIZE.min(pos);
        pos -= read;
        file.seek(SeekFrom::Start(pos))?;

        let mut chunk = vec![0u8; read as usize];
        file.read_exact(&mut chunk)?;
        chunk.extend_from_slice(&buf);
        buf = chunk;
    }

    let text = String::from_utf8_lossy(&buf);
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(n);
    // The first line may be a partial line when we stopped mid-file.
    let lines = all[start..].iter().map(|l| l.to_string()).collect();

    Ok(LogTail {
        path: path.to_path_buf(),
        lines,
    })
}

fn bytecount_newlines(buf: &[u8]) -> usize {
    buf.iter().filter(|&&b| b == b'\n').count()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn log_with_lines(count: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for i in 1..=count {
            writeln!(file, "line {i}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn clamp_defaults_and_bounds() {
        assert_eq!(clamp_lines(None), DEFAULT_LINES);
        assert_eq!(clamp_lines(Some(0)), 1);
        assert_eq!(clamp_lines(Some(50)), 50);
        assert_eq!(clamp_lines(Some(1_000_000)), MAX_LINES);
    }

    #[test]
    fn returns_last_n_lines() {
        let file = log_with_lines(10);
        let tail = tail(file.path(), 3).unwrap();
        assert_eq!(tail.lines, vec!["line 8", "line 9", "line 10"]);
    }

    #[test]
    fn short_file_returns_everything() {
        let file = log_with_lines(2);
        let tail = tail(file.path(), 100).unwrap();
        assert_eq!(tail.lines, vec!["line 1", "line 2"]);
    }

    #[test]
    fn empty_file_returns_no_lines() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let tail = tail(file.path(), 10).unwrap();
        assert!(tail.lines.is_empty());
    }

    #[test]
    fn spans_multiple_chunks() {
        // Roughly 20 KiB of log so the reader has to go back more than one chunk.
        let file = log_with_lines(2_000);
        let tail = tail(file.path(), 1_500).unwrap();
        assert_eq!(tail.lines.len(), 1_500);
        assert_eq!(tail.lines.first().map(String::as_str), Some("line 501"));
        assert_eq!(tail.lines.last().map(String::as_str), Some("line 2000"));
    }

    #[test]
    fn file_without_trailing_newline() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "a\nb\nc").unwrap();
        file.flush().unwrap();
        let tail = tail(file.path(), 2).unwrap();
        assert_eq!(tail.lines, vec!["b", "c"]);
    }

    #[test]
    fn discover_prefers_configured_file() {
        let configured = log_with_lines(1);
        let candidate = log_with_lines(1);
        let found = discover(Some(configured.path()), &[candidate.path()]);
        assert_eq!(found.as_deref(), Some(configured.path()));
    }

    #[test]
    fn discover_falls_back_to_first_existing_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.log");
        let candidate = log_with_lines(1);

        let found = discover(Some(missing.as_path()), &[missing.as_path(), candidate.path()]);
        assert_eq!(found.as_deref(), Some(candidate.path()));

        let none = discover::<&Path>(None, &[missing.as_path()]);
        assert!(none.is_none());
    }

    #[test]
    fn render_includes_header() {
        let tail = LogTail {
            path: PathBuf::from("/tmp/app.log"),
            lines: vec!["one".into(), "two".into()],
        };
        assert_eq!(
            tail.render(),
            "==> /tmp/app.log (last 2 lines) <==\none\ntwo\n"
        );
    }
}
