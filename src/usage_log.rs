//! Optional usage-logging collaborator.
//!
//! Records who searched for what, for operator reporting. The log is an
//! injected collaborator selected by configuration: one pipeline, with
//! [`NoopUsageLog`] standing in when logging is disabled. Logging
//! failures are isolated here: they are logged at warn level and never
//! reach the search/delivery pipeline.

use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

const CSV_HEADER: &str = "username;user_id;language_code;query;timestamp\n";

/// One recorded search request.
#[derive(Debug)]
pub struct UsageRecord<'a> {
    pub sender_id: i64,
    pub username: Option<&'a str>,
    pub language_code: Option<&'a str>,
    /// The raw query text as typed, before normalization.
    pub query: &'a str,
}

/// Usage log contract.
pub trait UsageLog: Send + Sync {
    /// Record one search request. Must never fail the caller.
    fn record(&self, record: &UsageRecord<'_>);

    /// Take the accumulated report, resetting the log. `None` when
    /// nothing has been recorded since the last report.
    fn take_report(&self) -> Option<Vec<u8>>;

    /// Put back a report whose delivery failed, ahead of anything
    /// recorded since it was taken. Must never fail the caller.
    fn restore_report(&self, report: Vec<u8>);
}

/// Disabled-logging collaborator.
pub struct NoopUsageLog;

impl UsageLog for NoopUsageLog {
    fn record(&self, _record: &UsageRecord<'_>) {}

    fn take_report(&self) -> Option<Vec<u8>> {
        None
    }

    fn restore_report(&self, _report: Vec<u8>) {}
}

/// Semicolon-separated CSV file logger.
pub struct CsvUsageLog {
    path: PathBuf,
    // Serializes append/report so a report never tears a row in half.
    lock: Mutex<()>,
}

impl CsvUsageLog {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn append_row(&self, row: &str) -> std::io::Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| std::io::Error::other("usage log lock poisoned"))?;
        let fresh = !self.path.exists();
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if fresh {
            file.write_all(CSV_HEADER.as_bytes())?;
        }
        file.write_all(row.as_bytes())
    }
}

/// Keep a field from breaking the `;`-separated row shape.
fn sanitize_field(value: &str) -> String {
    value
        .chars()
        .map(|c| if c == ';' || c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

impl UsageLog for CsvUsageLog {
    fn record(&self, record: &UsageRecord<'_>) {
        let timestamp = Utc::now().format("%d.%m.%Y %H:%M:%S");
        let row = format!(
            "{};{};{};{};{}\n",
            sanitize_field(record.username.unwrap_or_default()),
            record.sender_id,
            sanitize_field(record.language_code.unwrap_or_default()),
            sanitize_field(record.query),
            timestamp
        );
        if let Err(err) = self.append_row(&row) {
            tracing::warn!(error = %err, path = %self.path.display(), "usage log write failed");
        }
    }

    fn take_report(&self) -> Option<Vec<u8>> {
        let _guard = self.lock.lock().ok()?;
        let contents = fs::read(&self.path).ok()?;
        if contents.len() <= CSV_HEADER.len() {
            return None;
        }
        if let Err(err) = fs::write(&self.path, CSV_HEADER) {
            tracing::warn!(error = %err, "usage log reset failed");
        }
        Some(contents)
    }

    fn restore_report(&self, report: Vec<u8>) {
        let _guard = match self.lock.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        // Keep any rows recorded after the report was taken.
        let appended = fs::read(&self.path)
            .ok()
            .and_then(|current| current.strip_prefix(CSV_HEADER.as_bytes()).map(<[u8]>::to_vec))
            .unwrap_or_default();
        let mut restored = report;
        restored.extend_from_slice(&appended);
        if let Err(err) = fs::write(&self.path, &restored) {
            tracing::warn!(error = %err, path = %self.path.display(), "usage log restore failed");
        }
    }
}
