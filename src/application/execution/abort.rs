//! Cooperative cancellation for a single execution.
//!
//! An abort is honoured only until the buy leg fills. After the coordinator
//! commits (buy filled) the handle refuses further requests.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AbortState {
    Open,
    Requested,
    Committed,
}

/// Shared handle used to request and observe an abort.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    state: Arc<Mutex<AbortState>>,
}

impl AbortHandle {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(AbortState::Open)),
        }
    }

    /// Request an abort. Returns `false` if the execution already committed.
    pub fn abort(&self) -> bool {
        let mut state = self.state.lock();
        match *state {
            AbortState::Committed => {
                info!("Abort ignored, buy leg already filled");
                false
            }
            _ => {
                *state = AbortState::Requested;
                true
            }
        }
    }

    /// Whether an abort was requested before commit.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        *self.state.lock() == AbortState::Requested
    }

    /// Mark the point of no return once the buy leg has filled.
    ///
    /// Returns `true` if a pending abort request is being overridden.
    pub(crate) fn commit(&self) -> bool {
        let mut state = self.state.lock();
        let overridden = *state == AbortState::Requested;
        *state = AbortState::Committed;
        overridden
    }
}

impl Default for AbortHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_before_commit_is_observed() {
        let handle = AbortHandle::new();
        assert!(handle.abort());
        assert!(handle.is_requested());
    }

    #[test]
    fn commit_overrides_late_request() {
        let handle = AbortHandle::new();
        handle.abort();
        assert!(handle.commit());
        assert!(!handle.is_requested());
    }

    #[test]
    fn abort_after_commit_is_ignored() {
        let handle = AbortHandle::new();
        assert!(!handle.commit());
        assert!(!handle.abort());
        assert!(!handle.is_requested());
    }

    #[test]
    fn clones_share_state() {
        let handle = AbortHandle::new();
        let remote = handle.clone();
        remote.abort();
        assert!(handle.is_requested());
    }
}
