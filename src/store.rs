//! Local mirror of the service's document list and statistics.
//!
//! Both resources are replaced wholesale on every successful refresh. The
//! refreshes are passive: a failure is logged and otherwise ignored, the
//! previous snapshot stays in place.

use std::sync::Arc;

use crate::api::DocumentService;
use crate::fence::Fences;
use crate::state::SharedState;
use crate::viewer::DocumentViewer;

#[derive(Clone)]
pub struct DocumentStore {
    service: Arc<dyn DocumentService>,
    state: SharedState,
    fences: Arc<Fences>,
}

impl DocumentStore {
    pub fn new(service: Arc<dyn DocumentService>, state: SharedState, fences: Arc<Fences>) -> Self {
        Self {
            service,
            state,
            fences,
        }
    }

    /// Replace the local document list. Returns whether the response was
    /// applied.
    pub async fn refresh_documents(&self) -> bool {
        let ticket = self.fences.documents.issue();
        match self.service.list_documents().await {
            Ok(documents) => {
                if !self.fences.documents.is_current(ticket) {
                    tracing::debug!(?ticket, "dropping stale document list");
                    return false;
                }
                tracing::debug!(count = documents.len(), "document list refreshed");
                self.state.lock().documents = documents;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch documents");
                false
            }
        }
    }

    /// Replace the local statistics. Returns whether the response was
    /// applied.
    pub async fn refresh_stats(&self) -> bool {
        let ticket = self.fences.stats.issue();
        match self.service.stats().await {
            Ok(stats) => {
                if !self.fences.stats.is_current(ticket) {
                    tracing::debug!(?ticket, "dropping stale stats");
                    return false;
                }
                self.state.lock().stats = stats;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch stats");
                false
            }
        }
    }

    pub async fn refresh_all(&self) {
        tokio::join!(self.refresh_documents(), self.refresh_stats());
    }

    /// Delete a document the user has confirmed.
    ///
    /// On success the viewer is closed if it shows `id`, then list and stats
    /// are refreshed. On failure a generic alert is raised and nothing else
    /// changes.
    pub async fn delete(&self, id: &str, viewer: &DocumentViewer) -> bool {
        match self.service.delete_document(id).await {
            Ok(ack) => {
                tracing::info!(id, message = %ack.message, "document deleted");
                viewer.close_if_showing(id);
                self.refresh_all().await;
                true
            }
            Err(e) => {
                tracing::error!(id, error = %e, "failed to delete document");
                self.state.lock().alert("Failed to delete document");
                false
            }
        }
    }
}
