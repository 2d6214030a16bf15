//! # DSR Tasks
//!
//! One task per in-scope data source, owned by exactly one DSR. The
//! underlying extraction/erasure work is executed by external connectors
//! and may be long-running and retried; this module only models the
//! reported outcome.
//!
//! ## States
//!
//! PENDING → RUNNING → COMPLETED | VERIFIED | FAILED
//!
//! An outcome may also be recorded directly from PENDING — connectors
//! that do not report a start marker jump straight to a terminal status.

use serde::{Deserialize, Serialize};

use caseflow_core::{DataSourceId, DsrId, EngineError, RequestType, TaskId, TaskStatus, Timestamp};

// ─── Outcome ─────────────────────────────────────────────────────────

/// The outcome a connector reports for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskOutcome {
    /// Connector finished successfully with an opaque result payload.
    Completed {
        /// Extraction/erasure result, opaque to the engine.
        result: serde_json::Value,
    },
    /// Finished and verified by an officer.
    Verified {
        /// Extraction/erasure result, opaque to the engine.
        result: serde_json::Value,
    },
    /// Connector reported a failure.
    Failed {
        /// Failure description.
        error: String,
    },
}

impl TaskOutcome {
    /// The terminal status this outcome maps to.
    pub fn status(&self) -> TaskStatus {
        match self {
            Self::Completed { .. } => TaskStatus::Completed,
            Self::Verified { .. } => TaskStatus::Verified,
            Self::Failed { .. } => TaskStatus::Failed,
        }
    }
}

// ─── Task ────────────────────────────────────────────────────────────

/// A per-data-source task materialized by fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DsrTask {
    /// Unique task identifier.
    pub id: TaskId,
    /// The owning DSR. Tasks cannot outlive or be reassigned to another DSR.
    pub dsr_id: DsrId,
    /// The data source this task executes against.
    pub data_source_id: DataSourceId,
    /// Mirrors the parent DSR's type.
    pub task_type: RequestType,
    /// Current status.
    pub status: TaskStatus,
    /// Opaque result payload; set only on COMPLETED/VERIFIED.
    pub result: Option<serde_json::Value>,
    /// Failure description; set only on FAILED.
    pub error: Option<String>,
    /// When the task was materialized.
    pub created_at: Timestamp,
    /// When the task last changed.
    pub updated_at: Timestamp,
    /// Set when a terminal status is reached.
    pub completed_at: Option<Timestamp>,
}

impl DsrTask {
    /// Materialize a new task in `Pending`.
    pub fn new(
        dsr_id: DsrId,
        data_source_id: DataSourceId,
        task_type: RequestType,
        now: Timestamp,
    ) -> Self {
        Self {
            id: TaskId::new(),
            dsr_id,
            data_source_id,
            task_type,
            status: TaskStatus::Pending,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// A connector picked the task up (PENDING → RUNNING).
    pub fn start(&mut self, now: Timestamp) -> Result<(), EngineError> {
        if self.status != TaskStatus::Pending {
            return Err(EngineError::invalid_transition(
                "task",
                self.status,
                TaskStatus::Running,
            ));
        }
        self.status = TaskStatus::Running;
        self.updated_at = now;
        Ok(())
    }

    /// Record the connector's reported outcome.
    ///
    /// Valid only while the task is PENDING or RUNNING; a terminal task
    /// rejects any further outcome with [`EngineError::InvalidTransition`].
    pub fn record_outcome(
        &mut self,
        outcome: TaskOutcome,
        now: Timestamp,
    ) -> Result<(), EngineError> {
        if self.status.is_terminal() {
            return Err(EngineError::invalid_transition(
                "task",
                self.status,
                outcome.status(),
            ));
        }
        if let TaskOutcome::Failed { error } = &outcome {
            if error.trim().is_empty() {
                return Err(EngineError::validation(
                    "failed task outcome requires an error description",
                ));
            }
        }
        let to = outcome.status();
        match outcome {
            TaskOutcome::Completed { result } | TaskOutcome::Verified { result } => {
                self.result = Some(result);
            }
            TaskOutcome::Failed { error } => {
                self.error = Some(error);
            }
        }
        self.status = to;
        self.updated_at = now;
        self.completed_at = Some(now);
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
