//! Upload progress reporting.
//!
//! The upload controller emits an [`UploadProgressEvent`] when a file starts,
//! whenever its percentage moves, and when it settles. Reporters write to
//! **stderr** so stdout stays parseable for scripts.

use std::io::Write;

/// A single progress event for an upload batch.
#[derive(Clone, Debug, PartialEq)]
pub enum UploadProgressEvent {
    /// File `index` (1-based) of `total` is about to be sent.
    Started {
        name: String,
        index: usize,
        total: usize,
    },
    /// The current file's percentage advanced.
    Progress { name: String, percent: u8 },
    /// The file settled.
    Finished { name: String, ok: bool },
}

/// Receives upload progress. Implementations must tolerate being called
/// from the HTTP body stream.
pub trait UploadProgressReporter: Send + Sync {
    fn report(&self, event: UploadProgressEvent);
}

/// Human-friendly progress on stderr: `upload [2/5] report.pdf  45%`.
pub struct StderrProgress;

impl UploadProgressReporter for StderrProgress {
    fn report(&self, event: UploadProgressEvent) {
        let line = match &event {
            UploadProgressEvent::Started { name, index, total } => {
                format!("upload [{}/{}] {}\n", index, total, name)
            }
            UploadProgressEvent::Progress { name, percent } => {
                format!("upload {}  {:>3}%\n", name, percent)
            }
            UploadProgressEvent::Finished { name, ok } => {
                format!("upload {}  {}\n", name, if *ok { "done" } else { "failed" })
            }
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl UploadProgressReporter for JsonProgress {
    fn report(&self, event: UploadProgressEvent) {
        let obj = match &event {
            UploadProgressEvent::Started { name, index, total } => serde_json::json!({
                "event": "upload_started",
                "file": name,
                "index": index,
                "total": total
            }),
            UploadProgressEvent::Progress { name, percent } => serde_json::json!({
                "event": "upload_progress",
                "file": name,
                "percent": percent
            }),
            UploadProgressEvent::Finished { name, ok } => serde_json::json!({
                "event": "upload_finished",
                "file": name,
                "ok": ok
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl UploadProgressReporter for NoProgress {
    fn report(&self, _event: UploadProgressEvent) {}
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> std::sync::Arc<dyn UploadProgressReporter> {
        match self {
            ProgressMode::Off => std::sync::Arc::new(NoProgress),
            ProgressMode::Human => std::sync::Arc::new(StderrProgress),
            ProgressMode::Json => std::sync::Arc::new(JsonProgress),
        }
    }
}
