//! # Reportability Policy
//!
//! Determines whether a breach incident must be reported to each of the
//! two regulators. The incident record caches these booleans, but the
//! policy here is the only producer — they are recomputed on every
//! relevant field write and never set by direct user input.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use caseflow_core::Severity;

/// Whether CERT-In reporting is mandatory for this severity.
pub fn cert_in_required(severity: Severity) -> bool {
    matches!(severity, Severity::High | Severity::Critical)
}

/// Whether DPB reporting is mandatory.
///
/// True for any incident that has actually exposed personal data of at
/// least one subject: non-empty PII categories and a positive affected
/// subject count.
pub fn dpb_required(pii_categories: &BTreeSet<String>, affected_data_subject_count: u64) -> bool {
    !pii_categories.is_empty() && affected_data_subject_count > 0
}

/// The pair of cached reportability booleans carried on an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportabilityFlags {
    /// CERT-In report required.
    pub cert_in: bool,
    /// DPB report required.
    pub dpb: bool,
}

impl ReportabilityFlags {
    /// Evaluate both regulators' thresholds against current field values.
    pub fn evaluate(
        severity: Severity,
        pii_categories: &BTreeSet<String>,
        affected_data_subject_count: u64,
    ) -> Self {
        Self {
            cert_in: cert_in_required(severity),
            dpb: dpb_required(pii_categories, affected_data_subject_count),
        }
    }
}
