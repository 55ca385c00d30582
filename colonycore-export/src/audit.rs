// colonycore-export/src/audit.rs
// ============================================================================
// Module: Export Audit Sink
// Description: The audit event the export worker appends per job, and the
// sink trait it's written through.
// Purpose: Give every processed export job a durable, structured record
// without coupling the worker to a particular logging backend.
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

use crate::format::ExportFormat;
use crate::worker::ExportStatus;

/// One audit record for a completed (or failed) export job.
#[derive(Debug, Clone, Serialize)]
pub struct ExportAuditEntry {
    /// The export record's id.
    pub export_id: String,
    /// Who requested the export.
    pub requestor: String,
    /// The dataset template slug that was rendered.
    pub template_slug: String,
    /// The formats that were requested.
    pub formats: Vec<ExportFormat>,
    /// The job's terminal status.
    pub status: ExportStatus,
    /// RFC3339 timestamp of when the entry was recorded.
    pub timestamp: String,
}

/// Where the export worker writes [`ExportAuditEntry`] records.
pub trait AuditSink: Send + Sync {
    /// Records one audit entry. Sinks swallow their own I/O errors rather
    /// than propagate them: a logging failure must never fail the export
    /// job it's describing.
    fn record(&self, entry: &ExportAuditEntry);
}

/// Writes one JSON line per entry to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, entry: &ExportAuditEntry) {
        if let Ok(payload) = serde_json::to_string(entry) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Writes one JSON line per entry, appended to a file.
pub struct FileAuditSink {
    /// The open file handle entries are appended to.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens (or creates) the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file: Mutex::new(file) })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, entry: &ExportAuditEntry) {
        if let Ok(payload) = serde_json::to_string(entry)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Discards every entry. Used where export auditing is disabled.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _entry: &ExportAuditEntry) {}
}

#[cfg(test)]
mod tests {
    use std::io::Read as _;

    use super::*;

    fn sample_entry() -> ExportAuditEntry {
        ExportAuditEntry {
            export_id: "e1".to_string(),
            requestor: "alice".to_string(),
            template_slug: "frog-colony-v1".to_string(),
            formats: vec![ExportFormat::Json],
            status: ExportStatus::Succeeded,
            timestamp: "2026-07-28T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn file_sink_appends_a_json_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("audit.log");
        let sink = FileAuditSink::new(&path).expect("sink opens");
        sink.record(&sample_entry());
        let mut contents = String::new();
        std::fs::File::open(&path)
            .expect("file opens")
            .read_to_string(&mut contents)
            .expect("file reads");
        assert!(contents.contains("frog-colony-v1"));
        assert!(contents.ends_with('\n'));
    }

    #[test]
    fn noop_sink_discards_entries() {
        NoopAuditSink.record(&sample_entry());
    }
}
