//! Outcome of a single risk predicate.
//!
//! The predicates themselves live in `application::risk::RiskGate`; each
//! returns one of these so callers can log the specific failing check.

use crate::error::RiskError;

/// Result of a risk check for a proposed trade.
#[derive(Debug, Clone, PartialEq)]
pub enum RiskCheckResult {
    /// The check passed.
    Approved,

    /// The check failed with the given reason.
    Rejected(RiskError),
}

impl RiskCheckResult {
    /// Return `true` if the check passed.
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        matches!(self, RiskCheckResult::Approved)
    }

    /// Return the rejection error if the check failed.
    #[must_use]
    pub const fn rejection_error(&self) -> Option<&RiskError> {
        match self {
            RiskCheckResult::Rejected(e) => Some(e),
            RiskCheckResult::Approved => None,
        }
    }

    /// Convert into a `Result` so checks can be chained with `?`.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason when the check failed.
    pub fn into_result(self) -> Result<(), RiskError> {
        match self {
            RiskCheckResult::Approved => Ok(()),
            RiskCheckResult::Rejected(e) => Err(e),
        }
    }
}

impl From<Result<(), RiskError>> for RiskCheckResult {
    fn from(result: Result<(), RiskError>) -> Self {
        match result {
            Ok(()) => RiskCheckResult::Approved,
            Err(e) => RiskCheckResult::Rejected(e),
        }
    }
}
