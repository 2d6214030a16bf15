//! # Error Types — Engine Error Hierarchy
//!
//! Defines the error types used throughout the Caseflow engine. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Transition errors include the entity kind, current state, and
//!   attempted target state.
//! - `ConcurrentModification` and `StoreUnavailable` are the only kinds a
//!   caller should automatically retry; everything else signals a caller
//!   or data bug and must surface to the operator.
//! - The engine itself never retries — retry policy belongs to the caller.

use thiserror::Error;

/// Top-level error type for the Caseflow engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed or missing required input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Operation not legal from the entity's current state.
    #[error("invalid {entity} transition: {from} -> {to}")]
    InvalidTransition {
        /// Entity kind ("dsr", "task", "incident").
        entity: &'static str,
        /// Current state name.
        from: String,
        /// Attempted target state name.
        to: String,
    },

    /// Report requested when reportability policy forbids it.
    #[error("not reportable: {0}")]
    NotReportable(String),

    /// Unknown identifier.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind ("dsr", "task", "incident").
        kind: &'static str,
        /// The identifier that failed to resolve.
        id: String,
    },

    /// Optimistic concurrency check failed; caller must reload and retry.
    #[error("concurrent modification of {kind} {id}")]
    ConcurrentModification {
        /// Entity kind.
        kind: &'static str,
        /// The identifier whose version check failed.
        id: String,
    },

    /// Transient infrastructure failure; caller may retry with backoff.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl EngineError {
    /// Build a `Validation` error from anything displayable.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an `InvalidTransition` error from state names.
    pub fn invalid_transition(
        entity: &'static str,
        from: impl ToString,
        to: impl ToString,
    ) -> Self {
        Self::InvalidTransition {
            entity,
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Whether a caller may automatically retry the failed operation.
    ///
    /// Only optimistic-concurrency conflicts and transient store outages
    /// qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrentModification { .. } | Self::StoreUnavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_display() {
        let err = EngineError::invalid_transition("dsr", "COMPLETED", "APPROVED");
        assert_eq!(
            err.to_string(),
            "invalid dsr transition: COMPLETED -> APPROVED"
        );
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(EngineError::ConcurrentModification {
            kind: "dsr",
            id: "x".into()
        }
        .is_retryable());
        assert!(EngineError::StoreUnavailable("timeout".into()).is_retryable());
    }

    #[test]
    fn test_non_retryable_kinds() {
        assert!(!EngineError::validation("empty reason").is_retryable());
        assert!(!EngineError::invalid_transition("task", "FAILED", "RUNNING").is_retryable());
        assert!(!EngineError::NotReportable("severity LOW".into()).is_retryable());
        assert!(!EngineError::NotFound {
            kind: "incident",
            id: "y".into()
        }
        .is_retryable());
    }
}
