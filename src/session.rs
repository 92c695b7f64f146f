//! Wiring of service, state and controllers for one client session.

use std::sync::Arc;

use crate::api::DocumentService;
use crate::config::Config;
use crate::fence::Fences;
use crate::models::SearchOptions;
use crate::overlay::{forward_drops, DragDropOverlay};
use crate::progress::UploadProgressReporter;
use crate::search::SearchController;
use crate::state::{AppState, SharedState};
use crate::store::DocumentStore;
use crate::upload::{UploadController, UploadReport};
use crate::viewer::DocumentViewer;
use tokio::task::JoinHandle;

/// All controllers of a session, sharing one [`AppState`].
///
/// Cheap to clone; clones drive the same state.
#[derive(Clone)]
pub struct Session {
    pub state: SharedState,
    pub store: DocumentStore,
    pub uploads: UploadController,
    pub search: SearchController,
    pub viewer: DocumentViewer,
}

impl Session {
    pub fn new(
        service: Arc<dyn DocumentService>,
        initial: AppState,
        reporter: Arc<dyn UploadProgressReporter>,
    ) -> Self {
        let state = initial.shared();
        let fences = Arc::new(Fences::default());
        let store = DocumentStore::new(service.clone(), state.clone(), fences.clone());
        let uploads = UploadController::new(service.clone(), state.clone(), store.clone(), reporter);
        let search = SearchController::new(service.clone(), state.clone(), fences.clone());
        let viewer = DocumentViewer::new(service, state.clone(), fences);
        Self {
            state,
            store,
            uploads,
            search,
            viewer,
        }
    }

    /// Session seeded with the search defaults from config.
    pub fn from_config(
        config: &Config,
        service: Arc<dyn DocumentService>,
        reporter: Arc<dyn UploadProgressReporter>,
    ) -> Self {
        let options = SearchOptions {
            fuzzy: config.search.fuzzy,
            boolean_mode: config.search.boolean_mode,
            filters: Default::default(),
        };
        Self::new(service, AppState::new(config.search.scope, options), reporter)
    }

    /// Initial load of the document list and stats.
    pub async fn startup(&self) {
        self.store.refresh_all().await;
    }

    /// Delete a confirmed document; see [`DocumentStore::delete`].
    pub async fn delete(&self, id: &str) -> bool {
        self.store.delete(id, &self.viewer).await
    }

    /// Create a drag overlay bound to this session. Dropped files are
    /// uploaded by a background task; its handle yields the batch reports
    /// once the overlay is dropped.
    pub fn overlay(&self) -> (DragDropOverlay, JoinHandle<Vec<UploadReport>>) {
        let (overlay, events) = DragDropOverlay::new();
        let overlay = overlay.mirrored(self.state.clone());
        let handle = tokio::spawn(forward_drops(events, self.uploads.clone()));
        (overlay, handle)
    }

    pub fn take_alerts(&self) -> Vec<String> {
        self.state.lock().take_alerts()
    }

    /// Snapshot of the current state for rendering.
    pub fn snapshot(&self) -> AppState {
        self.state.lock().clone()
    }
}
