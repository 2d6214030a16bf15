//! # caseflow-policy — Pure Policy Functions
//!
//! The deadline and reportability policies of the Caseflow engine. Every
//! function here is pure: time is always a parameter, and no I/O happens
//! anywhere in this crate. The surrounding UI once computed these values
//! as inline view logic with slightly different formulas per screen; this
//! crate is the single source the whole system derives from.
//!
//! ## Modules
//!
//! - **`sla`** (`sla.rs`): DSR resolution deadlines by priority, incident
//!   reporting deadlines, `days_remaining`/`is_overdue` arithmetic, and
//!   the derived `SlaSnapshot` value.
//!
//! - **`config`** (`config.rs`): YAML-loadable SLA windows. The windows
//!   are configuration, not constants — they encode regulatory limits
//!   that vary by jurisdiction.
//!
//! - **`reportability`** (`reportability.rs`): CERT-In and DPB
//!   reportability predicates and the cached `ReportabilityFlags` pair.

pub mod config;
pub mod reportability;
pub mod sla;

// ─── SLA re-exports ──────────────────────────────────────────────────

pub use sla::{days_remaining, hours_remaining, is_overdue, SlaPolicy, SlaSnapshot};

// ─── Config re-exports ───────────────────────────────────────────────

pub use config::SlaConfig;

// ─── Reportability re-exports ────────────────────────────────────────

pub use reportability::{cert_in_required, dpb_required, ReportabilityFlags};
