//! Sequential multi-file ingestion.
//!
//! Files in a batch are submitted one at a time, in order. A file's upload
//! only starts after the previous one settled, and a batch only starts after
//! every earlier batch finished, whichever front end queued it. The single
//! progress value in [`UploadState`](crate::state::UploadState) therefore
//! always refers to exactly one file. A failing file raises an alert and the
//! batch moves on.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::api::{ApiError, DocumentService, ProgressFn};
use crate::models::{Document, FileType};
use crate::progress::{UploadProgressEvent, UploadProgressReporter};
use crate::state::{percent, SharedState};
use crate::store::DocumentStore;

/// A file queued for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    pub fn file_type(&self) -> Option<FileType> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(FileType::from_extension)
    }

    pub fn mime_type(&self) -> &'static str {
        self.file_type()
            .map(|t| t.mime_type())
            .unwrap_or("application/octet-stream")
    }
}

/// Outcome of one file in a batch.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub name: String,
    pub result: Result<Document, String>,
}

#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    pub outcomes: Vec<UploadOutcome>,
}

impl UploadReport {
    pub fn uploaded(&self) -> impl Iterator<Item = &Document> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Err(msg) => Some((o.name.as_str(), msg.as_str())),
            Ok(_) => None,
        })
    }

    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| o.result.is_err())
    }
}

#[derive(Clone)]
pub struct UploadController {
    service: Arc<dyn DocumentService>,
    state: SharedState,
    store: DocumentStore,
    reporter: Arc<dyn UploadProgressReporter>,
    /// Held for a whole batch; later batches wait their turn.
    queue: Arc<tokio::sync::Mutex<()>>,
}

impl UploadController {
    pub fn new(
        service: Arc<dyn DocumentService>,
        state: SharedState,
        store: DocumentStore,
        reporter: Arc<dyn UploadProgressReporter>,
    ) -> Self {
        Self {
            service,
            state,
            store,
            reporter,
            queue: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Upload every file in order, one at a time.
    ///
    /// Each success refreshes the document list and stats. Each failure
    /// raises `"Failed to upload {name}: {detail}"` and the batch continues.
    /// The upload state is idle again once this returns.
    pub async fn upload_batch(&self, files: Vec<UploadFile>) -> UploadReport {
        let _turn = self.queue.lock().await;
        let total = files.len();
        let mut report = UploadReport::default();

        for (i, file) in files.into_iter().enumerate() {
            self.state.lock().upload.begin_file();
            self.reporter.report(UploadProgressEvent::Started {
                name: file.name.clone(),
                index: i + 1,
                total,
            });

            let result = self
                .service
                .upload(&file, self.progress_callback(&file.name))
                .await;

            match result {
                Ok(doc) => {
                    tracing::info!(file = %file.name, id = %doc.id, "document uploaded");
                    self.reporter.report(UploadProgressEvent::Finished {
                        name: file.name.clone(),
                        ok: true,
                    });
                    self.store.refresh_all().await;
                    report.outcomes.push(UploadOutcome {
                        name: file.name,
                        result: Ok(doc),
                    });
                }
                Err(e) => {
                    tracing::error!(file = %file.name, error = %e, "upload failed");
                    let detail = e.user_message("Upload failed");
                    self.state
                        .lock()
                        .alert(format!("Failed to upload {}: {}", file.name, detail));
                    self.reporter.report(UploadProgressEvent::Finished {
                        name: file.name.clone(),
                        ok: false,
                    });
                    report.outcomes.push(UploadOutcome {
                        name: file.name,
                        result: Err(detail),
                    });
                }
            }
        }

        self.state.lock().upload.finish_batch();
        report
    }

    /// Read files from disk. An unreadable file raises the same alert as a
    /// failed upload and is returned as a failed outcome; the rest are read.
    pub async fn read_files(&self, paths: &[PathBuf]) -> (Vec<UploadFile>, Vec<UploadOutcome>) {
        let mut files = Vec::with_capacity(paths.len());
        let mut unreadable = Vec::new();
        for path in paths {
            match UploadFile::from_path(path).await {
                Ok(file) => files.push(file),
                Err(e) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    tracing::error!(path = %path.display(), error = %e, "cannot read file");
                    let detail = e.to_string();
                    self.state
                        .lock()
                        .alert(format!("Failed to upload {}: {}", name, detail));
                    unreadable.push(UploadOutcome {
                        name,
                        result: Err(detail),
                    });
                }
            }
        }
        (files, unreadable)
    }

    /// Read and upload files from disk. Unreadable files count as failures
    /// and never stop the others.
    pub async fn upload_paths(&self, paths: &[PathBuf]) -> UploadReport {
        let (files, unreadable) = self.read_files(paths).await;
        let mut report = self.upload_batch(files).await;
        report.outcomes.extend(unreadable);
        report
    }

    fn progress_callback(&self, name: &str) -> ProgressFn {
        let state = self.state.clone();
        let reporter = self.reporter.clone();
        let name = name.to_string();
        Arc::new(move |sent, total| {
            let pct = percent(sent, total);
            let advanced = {
                let mut state = state.lock();
                let before = state.upload.current_file_progress;
                state.upload.advance(pct);
                state.upload.current_file_progress > before
            };
            if advanced {
                reporter.report(UploadProgressEvent::Progress {
                    name: name.clone(),
                    percent: pct,
                });
            }
        })
    }
}

/// Expand upload arguments into a file list.
///
/// Directories are walked recursively and contribute only PDF, DOCX and TXT
/// files, sorted by path. Anything else is kept as given, whatever its
/// extension; a path that cannot be read fails on its own when it is read.
pub fn collect_upload_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| {
                    p.extension()
                        .and_then(|e| e.to_str())
                        .and_then(FileType::from_extension)
                        .is_some()
                })
                .collect();
            found.sort();
            out.extend(found);
        } else {
            out.push(path.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_collect_expands_directories() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::write(root.join("b.pdf"), b"%PDF").unwrap();
        fs::write(root.join("a.txt"), b"hello").unwrap();
        fs::write(root.join("image.png"), b"png").unwrap();
        fs::write(root.join("nested/c.DOCX"), b"zip").unwrap();

        let files = collect_upload_paths(&[root.to_path_buf()]);
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.pdf", "nested/c.DOCX"]);
    }

    #[test]
    fn test_collect_keeps_explicit_files() {
        let tmp = TempDir::new().unwrap();
        let odd = tmp.path().join("notes.md");
        fs::write(&odd, b"# notes").unwrap();
        let files = collect_upload_paths(&[odd.clone()]);
        assert_eq!(files, vec![odd.clone()]);

        let missing = tmp.path().join("missing.txt");
        let files = collect_upload_paths(&[odd.clone(), missing.clone()]);
        assert_eq!(files, vec![odd, missing]);
    }

    #[test]
    fn test_mime_type_from_name() {
        assert_eq!(UploadFile::new("x.PDF", b"".to_vec()).mime_type(), "application/pdf");
        assert_eq!(UploadFile::new("x.txt", b"".to_vec()).mime_type(), "text/plain");
        assert_eq!(
            UploadFile::new("x.bin", b"".to_vec()).mime_type(),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_from_path_reads_name_and_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("memo.txt");
        fs::write(&path, b"confidential").unwrap();
        let file = UploadFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "memo.txt");
        assert_eq!(file.bytes, b"confidential");
        assert!(UploadFile::from_path(&tmp.path().join("nope")).await.is_err());
    }
}
