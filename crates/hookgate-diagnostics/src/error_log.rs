//! Error log tail parsing.
//!
//! Only the last lines of the log are read. Each non-empty line becomes an
//! [`ErrorEntry`]; a leading timestamp is recognized in any of these forms:
//!
//! ```text
//! [2026-01-01T10:00:00.000Z] hookgate_hooks::runner: hook handler error
//! 2026-01-01T10:00:00Z something failed
//! 2026-01-01 10:00:00 something failed
//! ```
//!
//! Anything else keeps the whole line as the message with an unknown time.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::debug;

const UNKNOWN_TIMESTAMP: &str = "unknown";
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
/// Bytes read per step when scanning backwards from the end of the log.
const TAIL_CHUNK: u64 = 8 * 1024;

/// One line of the error log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    /// RFC 3339 timestamp, or `"unknown"`.
    pub timestamp: String,
    /// Rest of the line.
    pub message: String,
    #[serde(skip)]
    at: Option<DateTime<Utc>>,
}

impl ErrorEntry {
    /// Parsed time, if the line carried one.
    pub fn at(&self) -> Option<DateTime<Utc>> {
        self.at
    }

    /// Whether the entry falls within `window_ms` before `now`.
    ///
    /// Entries without a timestamp are never recent.
    pub fn is_recent(&self, now: DateTime<Utc>, window_ms: i64) -> bool {
        self.at
            .is_some_and(|at| now.signed_duration_since(at).num_milliseconds() <= window_ms)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn entry(at: Option<DateTime<Utc>>, message: &str) -> ErrorEntry {
    ErrorEntry {
        timestamp: at.map_or_else(
            || UNKNOWN_TIMESTAMP.to_string(),
            |t| t.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        message: message.trim().to_string(),
        at,
    }
}

/// Parse one log line.
pub fn parse_line(line: &str) -> ErrorEntry {
    let line = line.trim();

    if let Some(rest) = line.strip_prefix('[') {
        if let Some((inside, message)) = rest.split_once(']') {
            if let Some(at) = parse_timestamp(inside.trim()) {
                return entry(Some(at), message);
            }
        }
    }

    let mut words = line.splitn(2, char::is_whitespace);
    if let Some(first) = words.next() {
        if let Some(at) = parse_timestamp(first) {
            return entry(Some(at), words.next().unwrap_or(""));
        }
    }

    // "YYYY-MM-DD HH:MM:SS" spans two words.
    if let Some(prefix) = line.get(..19) {
        if let Some(at) = parse_timestamp(prefix) {
            return entry(Some(at), &line[19..]);
        }
    }

    entry(None, line)
}

/// Non-empty lines after the first newline of `buf`. The segment before it
/// may be a partial line; the last segment ends at end of file.
fn complete_lines(buf: &[u8]) -> usize {
    buf.split(|&b| b == b'\n')
        .skip(1)
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .count()
}

/// Trailing bytes of `path` holding at least `max_lines` complete non-empty
/// lines, or the whole file if it has fewer.
fn tail_bytes(path: &Path, max_lines: usize) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut start = file.metadata()?.len();
    let mut buf = Vec::new();

    while start > 0 {
        let step = start.min(TAIL_CHUNK);
        start -= step;
        let _ = file.seek(SeekFrom::Start(start))?;
        let mut chunk = Vec::new();
        let _ = file.by_ref().take(step).read_to_end(&mut chunk)?;
        chunk.extend_from_slice(&buf);
        buf = chunk;
        if complete_lines(&buf) >= max_lines {
            break;
        }
    }

    if start > 0 {
        if let Some(pos) = buf.iter().position(|&b| b == b'\n') {
            let _ = buf.drain(..=pos);
        }
    }
    Ok(buf)
}

/// The last `max_lines` non-empty lines of `path`.
///
/// Reads backwards from the end in fixed chunks, so a long log costs no more
/// than its tail. A missing or unreadable log is empty.
pub fn read_tail(path: &Path, max_lines: usize) -> Vec<String> {
    let bytes = match tail_bytes(path, max_lines) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "error log not readable");
            return Vec::new();
        }
    };
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].iter().map(|l| (*l).to_string()).collect()
}

/// Read and parse the tail of the error log.
pub fn load_error_log(path: &Path, max_lines: usize) -> Vec<ErrorEntry> {
    read_tail(path, max_lines)
        .iter()
        .map(|line| parse_line(line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fmt::Write as _;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, h, m, s).unwrap()
    }

    // --- parse_line ---

    #[test]
    fn bracketed_rfc3339() {
        let e = parse_line("[2026-01-02T10:00:00.123Z] hookgate_hooks::runner: boom");
        assert_eq!(e.at().unwrap().timestamp(), at(10, 0, 0).timestamp());
        assert_eq!(e.timestamp, "2026-01-02T10:00:00Z");
        assert_eq!(e.message, "hookgate_hooks::runner: boom");
    }

    #[test]
    fn bracketed_naive() {
        let e = parse_line("[2026-01-02 10:00:00] failed");
        assert_eq!(e.at(), Some(at(10, 0, 0)));
        assert_eq!(e.message, "failed");
    }

    #[test]
    fn bare_rfc3339() {
        let e = parse_line("2026-01-02T10:00:00+01:00 phase gate unreadable");
        assert_eq!(e.at(), Some(at(9, 0, 0)));
        assert_eq!(e.message, "phase gate unreadable");
    }

    #[test]
    fn bare_naive_two_words() {
        let e = parse_line("2026-01-02 10:30:00 - recall failed");
        assert_eq!(e.at(), Some(at(10, 30, 0)));
        assert_eq!(e.message, "- recall failed");
    }

    #[test]
    fn no_timestamp_is_unknown() {
        let e = parse_line("TypeError: cannot read property 'x'");
        assert!(e.at().is_none());
        assert_eq!(e.timestamp, "unknown");
        assert_eq!(e.message, "TypeError: cannot read property 'x'");
    }

    #[test]
    fn bracket_without_timestamp_is_unknown() {
        let e = parse_line("[phase-gate] denied");
        assert!(e.at().is_none());
        assert_eq!(e.message, "[phase-gate] denied");
    }

    #[test]
    fn short_multibyte_line_does_not_panic() {
        let e = parse_line("é");
        assert!(e.at().is_none());
        let long = parse_line("ééééééééééééééééééééé");
        assert!(long.at().is_none());
    }

    // --- recency ---

    #[test]
    fn recency_window() {
        let now = at(12, 0, 0);
        assert!(parse_line("[2026-01-02T11:30:00Z] x").is_recent(now, 3_600_000));
        assert!(!parse_line("[2026-01-02T10:59:59Z] x").is_recent(now, 3_600_000));
        assert!(!parse_line("no time").is_recent(now, 3_600_000));
    }

    // --- tail ---

    #[test]
    fn tail_keeps_last_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.log");
        let mut content = String::new();
        for i in 0..80 {
            let _ = writeln!(content, "line {i}");
        }
        content.push_str("\n\n");
        std::fs::write(&path, content).unwrap();

        let tail = read_tail(&path, 50);
        assert_eq!(tail.len(), 50);
        assert_eq!(tail[0], "line 30");
        assert_eq!(tail[49], "line 79");
    }

    #[test]
    fn tail_of_large_log_spans_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.log");
        let mut content = String::new();
        for i in 0..20_000 {
            let _ = writeln!(content, "[2026-01-02T10:00:00Z] entry {i:05} {}", "x".repeat(i % 300));
        }
        std::fs::write(&path, &content).unwrap();
        assert!(content.len() as u64 > 100 * TAIL_CHUNK);

        let tail = read_tail(&path, 50);
        assert_eq!(tail.len(), 50);
        assert!(tail[0].contains("entry 19950 "));
        assert!(tail[49].contains("entry 19999 "));
        assert!(tail.iter().all(|l| l.starts_with('[')));
    }

    #[test]
    fn long_lines_straddling_chunks_stay_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.log");
        let long = "y".repeat(usize::try_from(TAIL_CHUNK).unwrap() * 3);
        let content = format!("first\n{long}\nlast\n");
        std::fs::write(&path, content).unwrap();

        let tail = read_tail(&path, 2);
        assert_eq!(tail, vec![long, "last".to_string()]);
        assert_eq!(read_tail(&path, 10).len(), 3);
    }

    #[test]
    fn missing_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_error_log(&dir.path().join("none.log"), 50).is_empty());
    }

    #[test]
    fn unreadable_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file.
        assert!(load_error_log(dir.path(), 50).is_empty());
    }
}
