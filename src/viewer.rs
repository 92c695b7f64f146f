//! Modal display of a single document.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::api::DocumentService;
use crate::fence::Fences;
use crate::models::Document;
use crate::state::SharedState;

#[derive(Clone)]
pub struct DocumentViewer {
    service: Arc<dyn DocumentService>,
    state: SharedState,
    fences: Arc<Fences>,
    /// Id requested by the newest `open` that has not settled yet.
    opening: Arc<Mutex<Option<String>>>,
}

impl DocumentViewer {
    pub fn new(service: Arc<dyn DocumentService>, state: SharedState, fences: Arc<Fences>) -> Self {
        Self {
            service,
            state,
            fences,
            opening: Arc::new(Mutex::new(None)),
        }
    }

    /// Fetch the full document and show it. If another document is opened
    /// (or the viewer closed) before this fetch settles, the result is
    /// dropped.
    pub async fn open(&self, id: &str) -> Option<Document> {
        let ticket = {
            let mut opening = self.opening.lock();
            *opening = Some(id.to_string());
            self.fences.viewer.issue()
        };
        let result = self.service.get_document(id).await;

        let mut opening = self.opening.lock();
        if !self.fences.viewer.is_current(ticket) {
            tracing::debug!(id, "dropping superseded document fetch");
            return None;
        }
        *opening = None;

        match result {
            Ok(doc) => {
                self.state.lock().viewer = Some(doc.clone());
                Some(doc)
            }
            Err(e) => {
                tracing::error!(id, error = %e, "failed to fetch document");
                self.state
                    .lock()
                    .alert(e.user_message("Failed to load document"));
                None
            }
        }
    }

    /// Discard the shown document.
    pub fn close(&self) {
        let mut opening = self.opening.lock();
        *opening = None;
        self.fences.viewer.issue();
        self.state.lock().viewer = None;
    }

    /// Close the viewer if it shows `id`, and drop a pending fetch of `id`.
    /// A pending fetch of another document is left alone.
    pub fn close_if_showing(&self, id: &str) -> bool {
        let mut opening = self.opening.lock();
        if opening.as_deref() == Some(id) {
            *opening = None;
            self.fences.viewer.issue();
        }
        let mut state = self.state.lock();
        if state.viewed_id() == Some(id) {
            state.viewer = None;
            return true;
        }
        false
    }

    pub fn current(&self) -> Option<Document> {
        self.state.lock().viewer.clone()
    }
}
