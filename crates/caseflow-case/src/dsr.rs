//! # DSR Lifecycle State Machine
//!
//! Models the lifecycle of a data-subject request from intake through a
//! terminal outcome.
//!
//! ## States
//!
//! ```text
//! IdentityVerification ──▶ Pending ──▶ Approved ──▶ InProgress ──▶ Completed
//!                            │                          │          (terminal)
//!                            │                          │
//!                            └──▶ Rejected              └──▶ Failed
//!                                (terminal)                 (terminal)
//! ```
//!
//! `IdentityVerification` is a pre-Pending substate, entered instead of
//! `Pending` only when the request channel requires identity proofing
//! before an officer can see the case. A DSR with zero applicable data
//! sources moves `Approved → Completed` directly.
//!
//! Transitions are runtime-checked: cases are loaded from a store, so the
//! state is data, not a type. Every transition appends a record carrying
//! the (from, to, actor, timestamp) tuple the caller forwards to its
//! audit collaborator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use caseflow_core::{
    Actor, DsrId, DsrStatus, EngineError, Priority, RequestType, TenantId, Timestamp,
};

// ─── Subject Identity ────────────────────────────────────────────────

/// The data subject a request concerns.
///
/// The identifier map is free-form (account numbers, customer ids, …);
/// keys are unique and iteration order is stable. Vocabulary validation,
/// if any, belongs to a configuration collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectIdentity {
    /// Subject's display name.
    pub name: String,
    /// Contact address (email or phone) for correspondence.
    pub contact: String,
    /// Free-form identifier map, key → value.
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
}

impl SubjectIdentity {
    fn validate(&self) -> Result<(), EngineError> {
        if self.name.trim().is_empty() {
            return Err(EngineError::validation("subject name must not be empty"));
        }
        if self.contact.trim().is_empty() {
            return Err(EngineError::validation("subject contact must not be empty"));
        }
        Ok(())
    }
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of a DSR status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DsrTransitionRecord {
    /// Status before the transition.
    pub from_status: DsrStatus,
    /// Status after the transition.
    pub to_status: DsrStatus,
    /// Who initiated the transition.
    pub actor: Actor,
    /// When the transition occurred.
    pub timestamp: Timestamp,
}

// ─── Data-Subject Request ────────────────────────────────────────────

/// A data-subject request with its lifecycle state and transition history.
///
/// Tasks are owned by the DSR (one per in-scope data source, keyed by
/// `dsr_id`) but stored separately; the task store collaborator holds
/// them and the service layer composes the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSubjectRequest {
    /// Unique request identifier.
    pub id: DsrId,
    /// The tenant whose data sources are in scope.
    pub tenant: TenantId,
    /// The right being exercised. Immutable after creation.
    pub request_type: RequestType,
    /// Current lifecycle status.
    pub status: DsrStatus,
    /// The data subject.
    pub subject: SubjectIdentity,
    /// Priority; feeds the SLA window at creation.
    pub priority: Priority,
    /// Resolution deadline, computed once at creation. Never recomputed.
    pub sla_deadline: Timestamp,
    /// When the request was created.
    pub created_at: Timestamp,
    /// When the request last changed.
    pub updated_at: Timestamp,
    /// Set at the moment a terminal status is reached.
    pub completed_at: Option<Timestamp>,
    /// Rejection reason; set only on rejection, stored verbatim.
    pub reason: Option<String>,
    /// Ordered log of all status transitions.
    pub transitions: Vec<DsrTransitionRecord>,
}

impl DataSubjectRequest {
    /// Create a new request in `Pending`, or `IdentityVerification` when
    /// the request channel requires identity proofing.
    ///
    /// `sla_deadline` is computed by the SLA policy from `priority` and
    /// `now` before this constructor runs; the case stores it verbatim.
    ///
    /// # Errors
    ///
    /// [`EngineError::Validation`] if the subject name or contact is empty.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: DsrId,
        tenant: TenantId,
        request_type: RequestType,
        subject: SubjectIdentity,
        priority: Priority,
        requires_identity_verification: bool,
        sla_deadline: Timestamp,
        now: Timestamp,
    ) -> Result<Self, EngineError> {
        subject.validate()?;
        let status = if requires_identity_verification {
            DsrStatus::IdentityVerification
        } else {
            DsrStatus::Pending
        };
        Ok(Self {
            id,
            tenant,
            request_type,
            status,
            subject,
            priority,
            sla_deadline,
            created_at: now,
            updated_at: now,
            completed_at: None,
            reason: None,
            transitions: Vec::new(),
        })
    }

    /// Identity proofing succeeded (IDENTITY_VERIFICATION → PENDING).
    pub fn verify_identity(&mut self, actor: &Actor, now: Timestamp) -> Result<(), EngineError> {
        self.require_state(DsrStatus::IdentityVerification, DsrStatus::Pending)?;
        self.do_transition(DsrStatus::Pending, actor, now);
        Ok(())
    }

    /// Officer approves the request (PENDING → APPROVED).
    pub fn approve(&mut self, actor: &Actor, now: Timestamp) -> Result<(), EngineError> {
        self.require_state(DsrStatus::Pending, DsrStatus::Approved)?;
        self.do_transition(DsrStatus::Approved, actor, now);
        Ok(())
    }

    /// Officer rejects the request with a reason (PENDING → REJECTED).
    ///
    /// The reason is required and stored verbatim.
    pub fn reject(
        &mut self,
        reason: &str,
        actor: &Actor,
        now: Timestamp,
    ) -> Result<(), EngineError> {
        if reason.trim().is_empty() {
            return Err(EngineError::validation("rejection reason must not be empty"));
        }
        self.require_state(DsrStatus::Pending, DsrStatus::Rejected)?;
        self.reason = Some(reason.to_string());
        self.do_transition(DsrStatus::Rejected, actor, now);
        Ok(())
    }

    /// Fan-out materialized; execution begins (APPROVED → IN_PROGRESS).
    pub fn begin_execution(&mut self, actor: &Actor, now: Timestamp) -> Result<(), EngineError> {
        self.require_state(DsrStatus::Approved, DsrStatus::InProgress)?;
        self.do_transition(DsrStatus::InProgress, actor, now);
        Ok(())
    }

    /// Close the case as completed.
    ///
    /// Valid from `InProgress` (all tasks terminal, at least one
    /// succeeded) and from `Approved` (zero applicable data sources).
    pub fn complete(&mut self, actor: &Actor, now: Timestamp) -> Result<(), EngineError> {
        if !matches!(self.status, DsrStatus::InProgress | DsrStatus::Approved) {
            return Err(EngineError::invalid_transition(
                "dsr",
                self.status,
                DsrStatus::Completed,
            ));
        }
        self.do_transition(DsrStatus::Completed, actor, now);
        Ok(())
    }

    /// Close the case as failed: every task failed and none succeeded
    /// (IN_PROGRESS → FAILED).
    pub fn fail(&mut self, actor: &Actor, now: Timestamp) -> Result<(), EngineError> {
        self.require_state(DsrStatus::InProgress, DsrStatus::Failed)?;
        self.do_transition(DsrStatus::Failed, actor, now);
        Ok(())
    }

    /// Whether the request is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Validate that the request is in the expected state.
    fn require_state(&self, expected: DsrStatus, target: DsrStatus) -> Result<(), EngineError> {
        if self.status != expected {
            return Err(EngineError::invalid_transition("dsr", self.status, target));
        }
        Ok(())
    }

    /// Record a status transition.
    fn do_transition(&mut self, to: DsrStatus, actor: &Actor, now: Timestamp) {
        self.transitions.push(DsrTransitionRecord {
            from_status: self.status,
            to_status: to,
            actor: actor.clone(),
            timestamp: now,
        });
        self.status = to;
        self.updated_at = now;
        if to.is_terminal() {
            self.completed_at = Some(now);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn officer() -> Actor {
        Actor::new("officer-17")
    }

    fn subject() -> SubjectIdentity {
        SubjectIdentity {
            name: "Asha Rao".to_string(),
            contact: "asha.rao@example.com".to_string(),
            identifiers: BTreeMap::from([("customer_id".to_string(), "C-2291".to_string())]),
        }
    }

    fn make_pending(request_type: RequestType) -> DataSubjectRequest {
        let now = ts("2026-03-01T09:00:00Z");
        DataSubjectRequest::new(
            DsrId::new(),
            TenantId::new("acme"),
            request_type,
            subject(),
            Priority::High,
            false,
            ts("2026-03-04T09:00:00Z"),
            now,
        )
        .unwrap()
    }

    // ── Creation ─────────────────────────────────────────────────────

    #[test]
    fn test_new_request_is_pending() {
        let dsr = make_pending(RequestType::Access);
        assert_eq!(dsr.status, DsrStatus::Pending);
        assert!(dsr.completed_at.is_none());
        assert!(dsr.reason.is_none());
        assert!(dsr.transitions.is_empty());
    }

    #[test]
    fn test_new_request_with_identity_proofing() {
        let now = ts("2026-03-01T09:00:00Z");
        let dsr = DataSubjectRequest::new(
            DsrId::new(),
            TenantId::new("acme"),
            RequestType::Erasure,
            subject(),
            Priority::Medium,
            true,
            ts("2026-03-08T09:00:00Z"),
            now,
        )
        .unwrap();
        assert_eq!(dsr.status, DsrStatus::IdentityVerification);
    }

    #[test]
    fn test_new_request_rejects_empty_contact() {
        let now = ts("2026-03-01T09:00:00Z");
        let bad = SubjectIdentity {
            name: "Asha Rao".to_string(),
            contact: "  ".to_string(),
            identifiers: BTreeMap::new(),
        };
        let result = DataSubjectRequest::new(
            DsrId::new(),
            TenantId::new("acme"),
            RequestType::Access,
            bad,
            Priority::High,
            false,
            ts("2026-03-04T09:00:00Z"),
            now,
        );
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    // ── Happy-path lifecycle ─────────────────────────────────────────

    #[test]
    fn test_identity_verification_to_pending() {
        let now = ts("2026-03-01T09:00:00Z");
        let mut dsr = DataSubjectRequest::new(
            DsrId::new(),
            TenantId::new("acme"),
            RequestType::Access,
            subject(),
            Priority::High,
            true,
            ts("2026-03-04T09:00:00Z"),
            now,
        )
        .unwrap();
        dsr.verify_identity(&officer(), ts("2026-03-01T10:00:00Z")).unwrap();
        assert_eq!(dsr.status, DsrStatus::Pending);
        assert_eq!(dsr.transitions.len(), 1);
    }

    #[test]
    fn test_approve_then_execute_then_complete() {
        let mut dsr = make_pending(RequestType::Access);
        dsr.approve(&officer(), ts("2026-03-01T10:00:00Z")).unwrap();
        assert_eq!(dsr.status, DsrStatus::Approved);
        dsr.begin_execution(&officer(), ts("2026-03-01T10:00:00Z")).unwrap();
        assert_eq!(dsr.status, DsrStatus::InProgress);
        dsr.complete(&Actor::system(), ts("2026-03-02T08:00:00Z")).unwrap();
        assert_eq!(dsr.status, DsrStatus::Completed);
        assert_eq!(dsr.completed_at, Some(ts("2026-03-02T08:00:00Z")));
        assert_eq!(dsr.transitions.len(), 3);
    }

    #[test]
    fn test_zero_source_shortcut_approved_to_completed() {
        let mut dsr = make_pending(RequestType::Nomination);
        dsr.approve(&officer(), ts("2026-03-01T10:00:00Z")).unwrap();
        dsr.complete(&Actor::system(), ts("2026-03-01T10:00:00Z")).unwrap();
        assert_eq!(dsr.status, DsrStatus::Completed);
    }

    #[test]
    fn test_fail_from_in_progress() {
        let mut dsr = make_pending(RequestType::Erasure);
        dsr.approve(&officer(), ts("2026-03-01T10:00:00Z")).unwrap();
        dsr.begin_execution(&officer(), ts("2026-03-01T10:00:00Z")).unwrap();
        dsr.fail(&Actor::system(), ts("2026-03-02T08:00:00Z")).unwrap();
        assert_eq!(dsr.status, DsrStatus::Failed);
        assert!(dsr.completed_at.is_some());
    }

    // ── Rejection ────────────────────────────────────────────────────

    #[test]
    fn test_reject_stores_reason_verbatim() {
        let mut dsr = make_pending(RequestType::Access);
        dsr.reject("duplicate request", &officer(), ts("2026-03-01T11:00:00Z"))
            .unwrap();
        assert_eq!(dsr.status, DsrStatus::Rejected);
        assert_eq!(dsr.reason.as_deref(), Some("duplicate request"));
        assert_eq!(dsr.completed_at, Some(ts("2026-03-01T11:00:00Z")));
    }

    #[test]
    fn test_reject_requires_reason() {
        let mut dsr = make_pending(RequestType::Access);
        let result = dsr.reject("", &officer(), ts("2026-03-01T11:00:00Z"));
        assert!(matches!(result, Err(EngineError::Validation(_))));
        // Case untouched by the failed call.
        assert_eq!(dsr.status, DsrStatus::Pending);
        assert!(dsr.reason.is_none());
    }

    // ── Invalid transitions ──────────────────────────────────────────

    #[test]
    fn test_approve_twice_fails_second_time() {
        let mut dsr = make_pending(RequestType::Access);
        dsr.approve(&officer(), ts("2026-03-01T10:00:00Z")).unwrap();
        let result = dsr.approve(&officer(), ts("2026-03-01T10:01:00Z"));
        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
        assert_eq!(dsr.transitions.len(), 1);
    }

    #[test]
    fn test_cannot_reject_after_approve() {
        let mut dsr = make_pending(RequestType::Access);
        dsr.approve(&officer(), ts("2026-03-01T10:00:00Z")).unwrap();
        let result = dsr.reject("too late", &officer(), ts("2026-03-01T10:01:00Z"));
        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
    }

    #[test]
    fn test_cannot_execute_from_pending() {
        let mut dsr = make_pending(RequestType::Access);
        let result = dsr.begin_execution(&officer(), ts("2026-03-01T10:00:00Z"));
        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
    }

    #[test]
    fn test_terminal_states_are_frozen() {
        let mut dsr = make_pending(RequestType::Access);
        dsr.reject("duplicate", &officer(), ts("2026-03-01T11:00:00Z")).unwrap();
        assert!(dsr.approve(&officer(), ts("2026-03-01T12:00:00Z")).is_err());
        assert!(dsr
            .reject("again", &officer(), ts("2026-03-01T12:00:00Z"))
            .is_err());
        assert!(dsr.complete(&officer(), ts("2026-03-01T12:00:00Z")).is_err());
    }

    #[test]
    fn test_identity_verification_blocks_approval() {
        let now = ts("2026-03-01T09:00:00Z");
        let mut dsr = DataSubjectRequest::new(
            DsrId::new(),
            TenantId::new("acme"),
            RequestType::Access,
            subject(),
            Priority::High,
            true,
            ts("2026-03-04T09:00:00Z"),
            now,
        )
        .unwrap();
        assert!(dsr.approve(&officer(), now).is_err());
    }

    // ── Transition records ───────────────────────────────────────────

    #[test]
    fn test_transition_records_carry_audit_tuple() {
        let mut dsr = make_pending(RequestType::Access);
        dsr.approve(&officer(), ts("2026-03-01T10:00:00Z")).unwrap();
        let record = &dsr.transitions[0];
        assert_eq!(record.from_status, DsrStatus::Pending);
        assert_eq!(record.to_status, DsrStatus::Approved);
        assert_eq!(record.actor, officer());
        assert_eq!(record.timestamp, ts("2026-03-01T10:00:00Z"));
    }

    // ── Serialization ────────────────────────────────────────────────

    #[test]
    fn test_serialization_roundtrip() {
        let mut dsr = make_pending(RequestType::Portability);
        dsr.approve(&officer(), ts("2026-03-01T10:00:00Z")).unwrap();
        let json = serde_json::to_string(&dsr).unwrap();
        let parsed: DataSubjectRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, dsr);
    }
}
