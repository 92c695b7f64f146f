//! The client's single owned state.
//!
//! All mutable UI state lives in [`AppState`]. Controllers mutate it through
//! the methods below while holding the [`SharedState`] lock only for the
//! duration of the mutation, never across a service call.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::models::{Document, SearchOptions, SearchType, Stats};

pub type SharedState = Arc<Mutex<AppState>>;

/// Progress of the file currently being uploaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadState {
    pub in_progress: bool,
    /// 0..=100, for the current file only.
    pub current_file_progress: u8,
}

impl UploadState {
    /// Start a new file: busy, progress back to zero.
    pub fn begin_file(&mut self) {
        self.in_progress = true;
        self.current_file_progress = 0;
    }

    /// Record progress for the current file. Never moves backwards.
    pub fn advance(&mut self, percent: u8) {
        let percent = percent.min(100);
        if percent > self.current_file_progress {
            self.current_file_progress = percent;
        }
    }

    pub fn finish_batch(&mut self) {
        self.in_progress = false;
        self.current_file_progress = 0;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Active,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Mirror of the service's document list.
    pub documents: Vec<Document>,
    pub stats: Stats,
    /// Result set of the last applied search.
    pub results: Vec<Document>,
    /// Query the current `results` were produced for; used for emphasis.
    pub last_query: String,
    pub searching: bool,
    pub search_scope: SearchType,
    pub search_options: SearchOptions,
    pub upload: UploadState,
    pub drag: DragState,
    /// Document open in the viewer.
    pub viewer: Option<Document>,
    alerts: Vec<String>,
}

impl AppState {
    pub fn new(search_scope: SearchType, search_options: SearchOptions) -> Self {
        Self {
            search_scope,
            search_options,
            ..Self::default()
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    /// Queue a user-visible message.
    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    pub fn viewed_id(&self) -> Option<&str> {
        self.viewer.as_ref().map(|d| d.id.as_str())
    }
}

/// Integer percentage of an upload, `round(sent * 100 / total)`.
/// An empty body counts as complete.
pub fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = ((sent.min(total) as f64) * 100.0 / total as f64).round();
    pct as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_monotonic_and_resets_per_file() {
        let mut upload = UploadState::default();
        upload.begin_file();
        upload.advance(40);
        upload.advance(10);
        assert_eq!(upload.current_file_progress, 40);
        upload.advance(250);
        assert_eq!(upload.current_file_progress, 100);

        upload.begin_file();
        assert!(upload.in_progress);
        assert_eq!(upload.current_file_progress, 0);

        upload.finish_batch();
        assert_eq!(upload, UploadState::default());
    }

    #[test]
    fn test_percent_rounds() {
        assert_eq!(percent(0, 200), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(200, 200), 100);
        assert_eq!(percent(0, 0), 100);
    }

    #[test]
    fn test_alerts_drain() {
        let mut state = AppState::default();
        state.alert("one");
        state.alert(String::from("two"));
        assert_eq!(state.take_alerts(), vec!["one", "two"]);
        assert!(state.take_alerts().is_empty());
    }
}
