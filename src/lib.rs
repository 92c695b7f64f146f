//! # docvault
//!
//! Terminal client for a confidential-document search service.
//!
//! The service does the heavy lifting (text extraction, indexing, ranking).
//! This crate owns the client side of the interaction: sequential uploads
//! with per-file progress, query composition, reconciliation of results
//! against a local mirror of the corpus, literal query-term highlighting,
//! and drag-and-drop capture.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   Overlay    │──▶│   Uploads    │──▶│              │
//! │ (drag/drop)  │   └──────┬───────┘   │              │
//! └──────────────┘          │ refresh   │  Document    │
//!                    ┌──────▼───────┐   │  service     │
//!                    │ DocumentStore│──▶│  (HTTP)      │
//!                    └──────────────┘   │              │
//!  Search ─────────────────────────────▶│              │
//!  Viewer ─────────────────────────────▶│              │
//!                                       └──────────────┘
//!        all controllers mutate one AppState
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`api`] | Service contract and HTTP backend |
//! | [`config`] | TOML configuration parsing |
//! | [`fence`] | Request sequencing against stale responses |
//! | [`format`] | Size, date and number formatting |
//! | [`highlight`] | Query-term emphasis |
//! | [`models`] | Wire data types |
//! | [`overlay`] | Drag-and-drop state machine |
//! | [`progress`] | Upload progress reporters |
//! | [`render`] | Terminal output |
//! | [`search`] | Search controller |
//! | [`session`] | Controller wiring |
//! | [`shell`] | Interactive front end |
//! | [`state`] | Central client state |
//! | [`store`] | Document list and stats mirror |
//! | [`upload`] | Upload controller |
//! | [`viewer`] | Single-document viewer |

pub mod api;
pub mod config;
pub mod fence;
pub mod format;
pub mod highlight;
pub mod models;
pub mod overlay;
pub mod progress;
pub mod render;
pub mod search;
pub mod session;
pub mod shell;
pub mod state;
pub mod store;
pub mod upload;
pub mod viewer;
