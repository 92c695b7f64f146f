//! Request fencing for wholesale-replace state.
//!
//! Every refresh of a resource takes a ticket. A response may only be
//! applied while its ticket is still the newest one issued for that
//! resource; once a later request has started, the older response is stale
//! and gets dropped.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic sequence for one resource.
#[derive(Debug, Default)]
pub struct RequestFence {
    issued: AtomicU64,
}

/// Sequence number handed to a request when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl RequestFence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True when no request has been issued after `ticket`.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }
}

/// One fence per resource the client mirrors.
#[derive(Debug, Default)]
pub struct Fences {
    pub documents: RequestFence,
    pub stats: RequestFence,
    pub search: RequestFence,
    pub viewer: RequestFence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_ticket_is_current() {
        let fence = RequestFence::new();
        let a = fence.issue();
        assert!(fence.is_current(a));
        let b = fence.issue();
        assert!(!fence.is_current(a));
        assert!(fence.is_current(b));
        assert!(b > a);
    }

    #[test]
    fn fences_are_independent() {
        let fences = Fences::default();
        let docs = fences.documents.issue();
        fences.stats.issue();
        fences.search.issue();
        assert!(fences.documents.is_current(docs));
    }
}
