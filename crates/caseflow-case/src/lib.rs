//! # caseflow-case — Lifecycle State Machines
//!
//! Implements the lifecycle entities of the Caseflow engine. Transitions
//! are runtime-checked with structured error reporting — cases are loaded
//! from a store at runtime, so states are data, and every entity keeps an
//! ordered log of its transitions.
//!
//! ## State Machines
//!
//! - **DSR** (`dsr.rs`): `IdentityVerification → Pending → Approved →
//!   InProgress → Completed` with `Rejected` and `Failed` terminal
//!   branches.
//!
//! - **Task** (`task.rs`): `Pending → Running → Completed | Verified |
//!   Failed`, one task per in-scope data source, outcomes reported by
//!   external connectors.
//!
//! - **Incident** (`incident.rs`): `Open → Investigating → Contained →
//!   Resolved → Reported → Closed`, forward-only, with `Reported` gated
//!   on a generated CERT-In report and cached reportability flags
//!   recomputed on every field write.
//!
//! ## Derivations
//!
//! - **Fan-out** (`fanout.rs`): deterministic decomposition of a DSR into
//!   per-data-source tasks, ordered by ascending source id.
//!
//! - **Progress** (`progress.rs`): the single 0–100 completion estimate
//!   every UI surface reports.

pub mod dsr;
pub mod fanout;
pub mod incident;
pub mod progress;
pub mod task;

// ─── DSR re-exports ──────────────────────────────────────────────────

pub use dsr::{DataSubjectRequest, DsrTransitionRecord, SubjectIdentity};

// ─── Task re-exports ─────────────────────────────────────────────────

pub use task::{DsrTask, TaskOutcome};

// ─── Incident re-exports ─────────────────────────────────────────────

pub use incident::{
    BreachIncident, CertInReport, IncidentPatch, IncidentTransitionRecord, PointOfContact,
};

// ─── Derivation re-exports ───────────────────────────────────────────

pub use fanout::resolve;
pub use progress::{progress, FANOUT_PENDING_PROGRESS};
