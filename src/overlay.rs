//! Drag-and-drop capture.
//!
//! [`DragDropOverlay`] is a two-state machine fed by drag signals from the
//! top-level input surface. It does not talk to the upload controller
//! directly: it publishes [`OverlayEvent`]s on a channel, and
//! [`forward_drops`] turns every `FilesDropped` event into an upload batch.
//!
//! | From   | Signal       | To     | Default suppressed |
//! |--------|--------------|--------|--------------------|
//! | Idle   | Enter / Over | Active | yes |
//! | Active | Enter / Over | Active | yes |
//! | Active | Leave        | Idle   | no  |
//! | Active | Drop(files)  | Idle   | yes, files forwarded if any |
//! | Idle   | Leave / Drop | Idle   | no, ignored |

use tokio::sync::mpsc;

use crate::state::{DragState, SharedState};
use crate::upload::{UploadController, UploadFile, UploadReport};

/// Raw drag signal from the input surface.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSignal {
    Enter,
    Over,
    Leave,
    Drop(Vec<UploadFile>),
}

/// What the overlay tells the rest of the client.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    StateChanged(DragState),
    FilesDropped(Vec<UploadFile>),
}

/// Result of feeding one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: DragState,
    pub to: DragState,
    /// Whether the host should skip its default handling of the signal.
    pub suppress_default: bool,
}

pub struct DragDropOverlay {
    state: DragState,
    events: mpsc::UnboundedSender<OverlayEvent>,
    mirror: Option<SharedState>,
}

impl DragDropOverlay {
    /// Create an overlay and the receiving end of its event channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OverlayEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                state: DragState::Idle,
                events: tx,
                mirror: None,
            },
            rx,
        )
    }

    /// Mirror every state change into `AppState.drag`.
    pub fn mirrored(mut self, state: SharedState) -> Self {
        self.mirror = Some(state);
        self
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn handle(&mut self, signal: DragSignal) -> Transition {
        let from = self.state;
        let (to, suppress_default, dropped) = match (from, signal) {
            (_, DragSignal::Enter) | (_, DragSignal::Over) => (DragState::Active, true, None),
            (DragState::Active, DragSignal::Leave) => (DragState::Idle, false, None),
            (DragState::Active, DragSignal::Drop(files)) => (DragState::Idle, true, Some(files)),
            (DragState::Idle, DragSignal::Leave) | (DragState::Idle, DragSignal::Drop(_)) => {
                (DragState::Idle, false, None)
            }
        };

        self.state = to;
        if from != to {
            if let Some(ref mirror) = self.mirror {
                mirror.lock().drag = to;
            }
            self.emit(OverlayEvent::StateChanged(to));
        }
        if let Some(files) = dropped {
            if !files.is_empty() {
                self.emit(OverlayEvent::FilesDropped(files));
            }
        }

        Transition {
            from,
            to,
            suppress_default,
        }
    }

    fn emit(&self, event: OverlayEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("overlay event dropped: no listener");
        }
    }
}

/// Drain overlay events and upload every dropped batch, one batch at a
/// time. Returns the reports once the overlay is dropped.
pub async fn forward_drops(
    mut events: mpsc::UnboundedReceiver<OverlayEvent>,
    uploader: UploadController,
) -> Vec<UploadReport> {
    let mut reports = Vec::new();
    while let Some(event) = events.recv().await {
        match event {
            OverlayEvent::FilesDropped(files) => {
                tracing::debug!(count = files.len(), "files dropped");
                reports.push(uploader.upload_batch(files).await);
            }
            OverlayEvent::StateChanged(state) => {
                tracing::trace!(?state, "overlay state changed");
            }
        }
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    fn file(name: &str) -> UploadFile {
        UploadFile::new(name, b"x".to_vec())
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<OverlayEvent>) -> Vec<OverlayEvent> {
        let mut out = Vec::new();
        while let Ok(e) = rx.try_recv() {
            out.push(e);
        }
        out
    }

    #[test]
    fn enter_then_drop_forwards_files_and_returns_idle() {
        let (mut overlay, mut rx) = DragDropOverlay::new();
        let t = overlay.handle(DragSignal::Enter);
        assert_eq!(t.to, DragState::Active);
        assert!(t.suppress_default);

        let t = overlay.handle(DragSignal::Drop(vec![file("a.pdf")]));
        assert_eq!(t.from, DragState::Active);
        assert_eq!(t.to, DragState::Idle);
        assert!(t.suppress_default);

        assert_eq!(
            drain(&mut rx),
            vec![
                OverlayEvent::StateChanged(DragState::Active),
                OverlayEvent::StateChanged(DragState::Idle),
                OverlayEvent::FilesDropped(vec![file("a.pdf")]),
            ]
        );
    }

    #[test]
    fn leave_returns_to_idle_without_upload() {
        let (mut overlay, mut rx) = DragDropOverlay::new();
        overlay.handle(DragSignal::Over);
        overlay.handle(DragSignal::Over);
        let t = overlay.handle(DragSignal::Leave);
        assert_eq!(t.to, DragState::Idle);
        assert!(!t.suppress_default);
        assert_eq!(
            drain(&mut rx),
            vec![
                OverlayEvent::StateChanged(DragState::Active),
                OverlayEvent::StateChanged(DragState::Idle),
            ]
        );
    }

    #[test]
    fn empty_drop_emits_no_files() {
        let (mut overlay, mut rx) = DragDropOverlay::new();
        overlay.handle(DragSignal::Enter);
        overlay.handle(DragSignal::Drop(Vec::new()));
        assert_eq!(overlay.state(), DragState::Idle);
        assert!(!drain(&mut rx)
            .iter()
            .any(|e| matches!(e, OverlayEvent::FilesDropped(_))));
    }

    #[test]
    fn idle_ignores_leave_and_drop() {
        let (mut overlay, mut rx) = DragDropOverlay::new();
        let t = overlay.handle(DragSignal::Drop(vec![file("a.txt")]));
        assert_eq!(t.to, DragState::Idle);
        assert!(!t.suppress_default);
        overlay.handle(DragSignal::Leave);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn state_is_mirrored() {
        let shared = AppState::default().shared();
        let (overlay, _rx) = DragDropOverlay::new();
        let mut overlay = overlay.mirrored(shared.clone());
        overlay.handle(DragSignal::Enter);
        assert_eq!(shared.lock().drag, DragState::Active);
        overlay.handle(DragSignal::Leave);
        assert_eq!(shared.lock().drag, DragState::Idle);
    }
}
