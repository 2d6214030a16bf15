//! # caseflow-service — Case Service Façade
//!
//! The orchestration layer of the Caseflow engine. Composes the state
//! machines (`caseflow-case`) and policies (`caseflow-policy`) against
//! external collaborators — case store, task store, scope provider,
//! audit sink, notification dispatcher — and exposes the operations the
//! UI layer consumes.
//!
//! ## Modules
//!
//! - **`store`** (`store.rs`): the collaborator traits and the audit /
//!   notification payloads, with `Versioned<T>` optimistic concurrency.
//!
//! - **`memory`** (`memory.rs`): HashMap-backed reference stores and
//!   recording/tracing sinks — the integration-test harness and demo
//!   backing.
//!
//! - **`service`** (`service.rs`): `CaseService`, the synchronous domain
//!   façade. Per-case lock table, one versioned save per operation,
//!   audit events for every transition, fire-and-forget terminal
//!   notifications.
//!
//! ## Crate Policy
//!
//! - The engine is stateless between calls except for the stores it is
//!   handed.
//! - The engine never retries; `ConcurrentModification` and
//!   `StoreUnavailable` go back to the caller.

pub mod memory;
pub mod service;
pub mod store;

// ─── Store re-exports ────────────────────────────────────────────────

pub use store::{
    AuditSink, CaseNotification, CaseStore, DsrFilter, EntityKind, NotificationDispatcher,
    NotificationError, Page, ScopeProvider, TaskStore, TransitionEvent, Versioned,
};

// ─── Memory re-exports ───────────────────────────────────────────────

pub use memory::{
    MemoryCaseStore, MemoryTaskStore, RecordingAuditSink, RecordingNotifier, StaticScopeProvider,
    TracingAuditSink, TracingNotifier,
};

// ─── Service re-exports ──────────────────────────────────────────────

pub use service::{CaseService, DsrDetail, IncidentDetail, NewDsr, NewIncident};
