//! # caseflow-core — Foundational Types for the Caseflow Engine
//!
//! This crate is the bedrock of the Caseflow compliance engine. It defines
//! the type-system primitives every other crate in the workspace builds
//! on; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `DsrId`, `TaskId`,
//!    `IncidentId`, `DataSourceId`, `TenantId`, `Actor` — all newtypes.
//!    No bare strings or bare UUIDs for identifiers.
//!
//! 2. **Single authoritative domain enums.** Request type, priority,
//!    severity, and the three lifecycle status enums are defined once
//!    here, with exhaustive `match` everywhere. Adding a variant forces
//!    every consumer to handle it.
//!
//! 3. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision — deadline arithmetic never sees a
//!    timezone offset or sub-second noise.
//!
//! 4. **Injectable time.** The `Clock` trait keeps every deadline and
//!    lifecycle computation deterministic under test.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `caseflow-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement `Serialize`/`Deserialize`.

pub mod clock;
pub mod domain;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::{DsrStatus, IncidentStatus, Priority, RequestType, Severity, TaskStatus};
pub use error::EngineError;
pub use identity::{Actor, DataSourceId, DsrId, IncidentId, ReportId, TaskId, TenantId};
pub use temporal::Timestamp;
