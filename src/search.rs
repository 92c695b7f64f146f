//! Query composition and result reconciliation.
//!
//! A search replaces the displayed result set wholesale with the service's
//! response. Only the newest search may apply its outcome: a response that
//! arrives after a later search started is dropped, so results never go
//! back in time.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::api::DocumentService;
use crate::fence::Fences;
use crate::models::{FileType, SearchOptions, SearchRequest, SearchType};
use crate::state::SharedState;

/// What a call to [`SearchController::search`] did to the displayed results.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Blank query: results cleared, nothing sent.
    Cleared,
    /// Results replaced with `count` documents.
    Applied { count: usize, search_time: Option<f64> },
    /// The call failed; results unchanged.
    Failed { message: String },
    /// A later search started first; this response was dropped.
    Superseded,
}

#[derive(Clone)]
pub struct SearchController {
    service: Arc<dyn DocumentService>,
    state: SharedState,
    fences: Arc<Fences>,
}

impl SearchController {
    pub fn new(service: Arc<dyn DocumentService>, state: SharedState, fences: Arc<Fences>) -> Self {
        Self {
            service,
            state,
            fences,
        }
    }

    /// Search with the session's current scope and options.
    pub async fn search(&self, query: &str) -> SearchOutcome {
        let (scope, options) = {
            let state = self.state.lock();
            (state.search_scope, state.search_options.clone())
        };
        self.search_with(query, scope, &options).await
    }

    /// Search with an explicit scope and options.
    pub async fn search_with(
        &self,
        query: &str,
        scope: SearchType,
        options: &SearchOptions,
    ) -> SearchOutcome {
        let ticket = self.fences.search.issue();

        let request = match SearchRequest::compose(query, scope, options) {
            Some(r) => r,
            None => {
                let mut state = self.state.lock();
                state.results.clear();
                state.last_query.clear();
                state.searching = false;
                return SearchOutcome::Cleared;
            }
        };

        self.state.lock().searching = true;
        tracing::debug!(query = %request.query, scope = %scope, "searching");

        let result = self.service.search(&request).await;

        let mut state = self.state.lock();
        if !self.fences.search.is_current(ticket) {
            tracing::debug!(query = %request.query, "dropping superseded search response");
            return SearchOutcome::Superseded;
        }
        state.searching = false;

        match result {
            Ok(response) => {
                let count = response.documents.len();
                state.results = response.documents;
                state.last_query = request.query;
                SearchOutcome::Applied {
                    count,
                    search_time: response.search_time,
                }
            }
            Err(e) => {
                tracing::error!(query = %request.query, error = %e, "search failed");
                let message = e.user_message("Search failed");
                state.alert(message.clone());
                SearchOutcome::Failed { message }
            }
        }
    }

    pub fn set_scope(&self, scope: SearchType) {
        self.state.lock().search_scope = scope;
    }

    pub fn set_fuzzy(&self, on: bool) {
        self.state.lock().search_options.fuzzy = on;
    }

    pub fn set_boolean_mode(&self, on: bool) {
        self.state.lock().search_options.boolean_mode = on;
    }

    /// Set the file-type filter from raw input. Blank input unsets it.
    pub fn set_file_type_filter(&self, raw: &str) -> Result<(), String> {
        let value = parse_optional(raw, |s| s.parse::<FileType>())?;
        self.state.lock().search_options.filters.file_type = value;
        Ok(())
    }

    /// Set the lower date bound (`YYYY-MM-DD`). Blank input unsets it.
    pub fn set_date_from(&self, raw: &str) -> Result<(), String> {
        let value = parse_optional(raw, parse_date)?;
        self.state.lock().search_options.filters.date_from = value;
        Ok(())
    }

    /// Set the upper date bound (`YYYY-MM-DD`). Blank input unsets it.
    pub fn set_date_to(&self, raw: &str) -> Result<(), String> {
        let value = parse_optional(raw, parse_date)?;
        self.state.lock().search_options.filters.date_to = value;
        Ok(())
    }

    pub fn clear_filters(&self) {
        self.state.lock().search_options.filters = Default::default();
    }

    pub fn options(&self) -> (SearchType, SearchOptions) {
        let state = self.state.lock();
        (state.search_scope, state.search_options.clone())
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}': expected YYYY-MM-DD", raw.trim()))
}

fn parse_optional<T>(
    raw: &str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<Option<T>, String> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        Ok(None)
    } else {
        parse(raw).map(Some)
    }
}
