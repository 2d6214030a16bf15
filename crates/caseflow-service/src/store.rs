//! # Collaborator Traits
//!
//! The external collaborators the engine orchestrates against. The engine
//! implements none of these — persistence, scope resolution, audit
//! storage, and notification transport all live outside it.
//!
//! Store implementations are expected to bound their I/O with timeouts
//! and surface an expired or failed call as
//! [`EngineError::StoreUnavailable`]; version-check failures surface as
//! [`EngineError::ConcurrentModification`]. Both are safe for the caller
//! to retry — nothing else is.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use caseflow_case::{BreachIncident, DataSubjectRequest, DsrTask};
use caseflow_core::{
    Actor, DataSourceId, DsrId, DsrStatus, EngineError, IncidentId, TaskId, TenantId, Timestamp,
};

// ─── Versioning ──────────────────────────────────────────────────────

/// A stored record with its optimistic-concurrency version.
///
/// Every save carries the version the caller loaded; a mismatch means
/// another writer got there first.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    /// The stored record.
    pub record: T,
    /// Monotonically increasing version, bumped on every save.
    pub version: u64,
}

// ─── Listing ─────────────────────────────────────────────────────────

/// Filter for DSR listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DsrFilter {
    /// Only cases in this status.
    pub status: Option<DsrStatus>,
}

/// Offset/limit page for listings. Results are ordered newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Records to skip.
    pub offset: usize,
    /// Maximum records to return.
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

// ─── Stores ──────────────────────────────────────────────────────────

/// Load/save access to DSR and incident case records.
pub trait CaseStore: Send + Sync {
    /// Insert a newly created DSR at version 1.
    fn insert_dsr(&self, dsr: DataSubjectRequest) -> Result<(), EngineError>;

    /// Load a DSR with its current version.
    fn load_dsr(&self, id: &DsrId) -> Result<Versioned<DataSubjectRequest>, EngineError>;

    /// Save a DSR if `expected_version` still matches; returns the new version.
    fn save_dsr(
        &self,
        dsr: &DataSubjectRequest,
        expected_version: u64,
    ) -> Result<u64, EngineError>;

    /// List DSRs matching `filter`, newest first, windowed by `page`.
    fn list_dsrs(
        &self,
        filter: &DsrFilter,
        page: &Page,
    ) -> Result<Vec<DataSubjectRequest>, EngineError>;

    /// Insert a newly created incident at version 1.
    fn insert_incident(&self, incident: BreachIncident) -> Result<(), EngineError>;

    /// Load an incident with its current version.
    fn load_incident(&self, id: &IncidentId) -> Result<Versioned<BreachIncident>, EngineError>;

    /// Save an incident if `expected_version` still matches; returns the new version.
    fn save_incident(
        &self,
        incident: &BreachIncident,
        expected_version: u64,
    ) -> Result<u64, EngineError>;
}

/// Load/save access to DSR tasks.
pub trait TaskStore: Send + Sync {
    /// Insert the fan-out batch for a DSR.
    ///
    /// Replaces any batch previously inserted for the same DSR: fan-out
    /// is deterministic, so a retried approval writes the same membership
    /// and order rather than duplicating tasks.
    fn insert_batch(&self, tasks: &[DsrTask]) -> Result<(), EngineError>;

    /// All tasks owned by a DSR, in fan-out order.
    fn tasks_for_dsr(&self, dsr_id: &DsrId) -> Result<Vec<DsrTask>, EngineError>;

    /// Load a single task with its current version.
    fn load_task(&self, id: &TaskId) -> Result<Versioned<DsrTask>, EngineError>;

    /// Save a task if `expected_version` still matches; returns the new version.
    fn update_task(&self, task: &DsrTask, expected_version: u64) -> Result<u64, EngineError>;
}

/// Resolves which data sources are in DSR scope for a tenant.
pub trait ScopeProvider: Send + Sync {
    /// The data sources currently in scope. Order is not significant;
    /// fan-out sorts.
    fn sources_in_scope(&self, tenant: &TenantId) -> Result<Vec<DataSourceId>, EngineError>;
}

// ─── Audit ───────────────────────────────────────────────────────────

/// The entity kind a transition event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    /// A data-subject request.
    Dsr,
    /// A per-data-source task.
    Task,
    /// A breach incident.
    Incident,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Dsr => "DSR",
            Self::Task => "TASK",
            Self::Incident => "INCIDENT",
        };
        f.write_str(s)
    }
}

/// The tuple the engine hands its audit collaborator for every
/// transition. The engine never persists audit records itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    /// What kind of entity transitioned.
    pub entity: EntityKind,
    /// The entity's identifier.
    pub entity_id: String,
    /// Status before.
    pub old_status: String,
    /// Status after.
    pub new_status: String,
    /// Who initiated the transition.
    pub actor: Actor,
    /// When the transition occurred.
    pub timestamp: Timestamp,
}

/// Receives one event per transition, in order, within the operation
/// that produced it.
pub trait AuditSink: Send + Sync {
    /// Record a transition event.
    fn record(&self, event: TransitionEvent);
}

// ─── Notifications ───────────────────────────────────────────────────

/// Terminal-transition notices. Fire-and-forget from the engine's
/// perspective: a dispatch failure never fails the transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseNotification {
    /// A DSR reached COMPLETED.
    DsrCompleted {
        /// The completed case.
        dsr_id: DsrId,
    },
    /// A DSR was rejected.
    DsrRejected {
        /// The rejected case.
        dsr_id: DsrId,
    },
    /// A DSR reached FAILED.
    DsrFailed {
        /// The failed case.
        dsr_id: DsrId,
    },
    /// An incident reached REPORTED.
    IncidentReported {
        /// The reported incident.
        incident_id: IncidentId,
    },
    /// An incident was closed.
    IncidentClosed {
        /// The closed incident.
        incident_id: IncidentId,
    },
}

/// Error from a notification dispatcher. Logged and dropped by the
/// engine, never propagated.
#[derive(Error, Debug)]
#[error("notification dispatch failed: {0}")]
pub struct NotificationError(pub String);

/// Delivers terminal-transition notices to whatever transports the
/// deployment wires up.
pub trait NotificationDispatcher: Send + Sync {
    /// Dispatch a notice.
    fn dispatch(&self, notification: CaseNotification) -> Result<(), NotificationError>;
}
