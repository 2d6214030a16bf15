//! # Compliance Case Domain Enums
//!
//! Single authoritative definitions of the case-domain vocabulary: request
//! types, priorities, severities, and the status enums of the three
//! lifecycle entities (DSR, DSR task, breach incident). Every consumer
//! matches exhaustively — adding a variant forces every call site to
//! handle it.
//!
//! Wire and display form is SCREAMING_SNAKE_CASE throughout, matching the
//! values the surrounding service layer exchanges with its UI.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ─── Request Type ────────────────────────────────────────────────────

/// The kind of data-subject request. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
    /// Subject requests a copy of their personal data.
    Access,
    /// Subject requests deletion of their personal data.
    Erasure,
    /// Subject requests correction of inaccurate personal data.
    Correction,
    /// Subject requests their data in a machine-readable format.
    Portability,
    /// Subject nominates a representative to act on their behalf.
    Nomination,
    /// Subject files a grievance about data handling.
    Grievance,
}

impl RequestType {
    /// Whether requests of this type fan out into per-data-source tasks.
    ///
    /// Nomination and grievance requests are pure case records; they never
    /// execute against data sources.
    pub fn executes_against_sources(&self) -> bool {
        matches!(
            self,
            Self::Access | Self::Erasure | Self::Correction | Self::Portability
        )
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Access => "ACCESS",
            Self::Erasure => "ERASURE",
            Self::Correction => "CORRECTION",
            Self::Portability => "PORTABILITY",
            Self::Nomination => "NOMINATION",
            Self::Grievance => "GRIEVANCE",
        };
        f.write_str(s)
    }
}

impl FromStr for RequestType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACCESS" => Ok(Self::Access),
            "ERASURE" => Ok(Self::Erasure),
            "CORRECTION" => Ok(Self::Correction),
            "PORTABILITY" => Ok(Self::Portability),
            "NOMINATION" => Ok(Self::Nomination),
            "GRIEVANCE" => Ok(Self::Grievance),
            other => Err(EngineError::validation(format!(
                "unrecognized request type: {other:?}"
            ))),
        }
    }
}

// ─── Priority ────────────────────────────────────────────────────────

/// DSR priority. Set at creation; feeds the SLA window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// Shortest SLA window.
    High,
    /// Standard SLA window.
    Medium,
    /// Longest SLA window.
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        };
        f.write_str(s)
    }
}

// ─── Severity ────────────────────────────────────────────────────────

/// Breach incident severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Minimal impact.
    Low,
    /// Limited impact.
    Medium,
    /// Significant impact; triggers CERT-In reportability.
    High,
    /// Severe impact; triggers CERT-In reportability.
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

// ─── DSR Status ──────────────────────────────────────────────────────

/// The lifecycle status of a data-subject request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DsrStatus {
    /// Pre-Pending substate: the request channel requires identity
    /// proofing before an officer can see the case.
    IdentityVerification,
    /// Awaiting officer review.
    Pending,
    /// Approved by an officer; fan-out not yet materialized.
    Approved,
    /// Tasks materialized and executing against data sources.
    InProgress,
    /// At least one task succeeded and all are terminal (terminal).
    Completed,
    /// Rejected by an officer with a reason (terminal).
    Rejected,
    /// Every task failed and none succeeded (terminal).
    Failed,
}

impl DsrStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Failed)
    }
}

impl std::fmt::Display for DsrStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::IdentityVerification => "IDENTITY_VERIFICATION",
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Rejected => "REJECTED",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

impl FromStr for DsrStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IDENTITY_VERIFICATION" => Ok(Self::IdentityVerification),
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "REJECTED" => Ok(Self::Rejected),
            "FAILED" => Ok(Self::Failed),
            other => Err(EngineError::validation(format!(
                "unrecognized DSR status: {other:?}"
            ))),
        }
    }
}

// ─── Task Status ─────────────────────────────────────────────────────

/// The status of a single per-data-source task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Created by fan-out; not yet picked up.
    Pending,
    /// Picked up by a data-source connector.
    Running,
    /// Connector finished successfully (terminal).
    Completed,
    /// Result verified by an officer (terminal).
    Verified,
    /// Connector reported a failure (terminal).
    Failed,
}

impl TaskStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Verified | Self::Failed)
    }

    /// Whether this status counts as a successful outcome.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed | Self::Verified)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Verified => "VERIFIED",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

// ─── Incident Status ─────────────────────────────────────────────────

/// The lifecycle status of a breach incident.
///
/// Transitions are monotonic forward-only through the declared ordering;
/// no backward transition is ever permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentStatus {
    /// Newly recorded.
    Open,
    /// Under active investigation.
    Investigating,
    /// Breach vector contained.
    Contained,
    /// Root cause addressed.
    Resolved,
    /// Regulatory report generated and filed.
    Reported,
    /// Case closed (terminal).
    Closed,
}

impl IncidentStatus {
    /// Position in the forward-only ordering.
    pub fn ordinal(&self) -> u8 {
        match self {
            Self::Open => 0,
            Self::Investigating => 1,
            Self::Contained => 2,
            Self::Resolved => 3,
            Self::Reported => 4,
            Self::Closed => 5,
        }
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Open => "OPEN",
            Self::Investigating => "INVESTIGATING",
            Self::Contained => "CONTAINED",
            Self::Resolved => "RESOLVED",
            Self::Reported => "REPORTED",
            Self::Closed => "CLOSED",
        };
        f.write_str(s)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
