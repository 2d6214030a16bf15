//! # SLA Policy — Deadline Arithmetic
//!
//! Pure, deterministic deadline computation from case timestamps, priority,
//! and the configured regulatory windows. Every function takes `now` as a
//! parameter — nothing here reads a system clock.
//!
//! The windows are fields, not constants: they encode regulatory SLA
//! windows that vary by jurisdiction. `SlaPolicy::default()` carries the
//! baseline deployment values (3/7/15 days for DSRs, 6h CERT-In, 72h DPB).

use chrono::Duration;
use serde::{Deserialize, Serialize};

use caseflow_core::{Priority, Timestamp};

const SECS_PER_DAY: i64 = 86_400;
const SECS_PER_HOUR: i64 = 3_600;

/// The configured SLA windows for a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlaPolicy {
    /// Resolution window for HIGH-priority DSRs.
    pub dsr_high: Duration,
    /// Resolution window for MEDIUM-priority DSRs.
    pub dsr_medium: Duration,
    /// Resolution window for LOW-priority DSRs.
    pub dsr_low: Duration,
    /// CERT-In mandatory reporting window after detection.
    pub cert_in: Duration,
    /// DPB mandatory reporting window after detection.
    pub dpb: Duration,
}

impl Default for SlaPolicy {
    fn default() -> Self {
        Self {
            dsr_high: Duration::days(3),
            dsr_medium: Duration::days(7),
            dsr_low: Duration::days(15),
            cert_in: Duration::hours(6),
            dpb: Duration::hours(72),
        }
    }
}

impl SlaPolicy {
    /// The resolution deadline for a DSR created at `created_at`.
    ///
    /// Computed once at creation (or approval) and stored on the case;
    /// never recomputed afterward.
    pub fn dsr_deadline(&self, priority: Priority, created_at: Timestamp) -> Timestamp {
        let window = match priority {
            Priority::High => self.dsr_high,
            Priority::Medium => self.dsr_medium,
            Priority::Low => self.dsr_low,
        };
        created_at + window
    }

    /// The CERT-In reporting deadline for an incident detected at `detected_at`.
    pub fn cert_in_deadline(&self, detected_at: Timestamp) -> Timestamp {
        detected_at + self.cert_in
    }

    /// The DPB reporting deadline for an incident detected at `detected_at`.
    pub fn dpb_deadline(&self, detected_at: Timestamp) -> Timestamp {
        detected_at + self.dpb
    }

    /// Derive the full SLA snapshot for an incident at `now`.
    ///
    /// A value, not a stored entity — recomputed on every read.
    pub fn incident_snapshot(&self, detected_at: Timestamp, now: Timestamp) -> SlaSnapshot {
        let cert_in_deadline = self.cert_in_deadline(detected_at);
        let dpb_deadline = self.dpb_deadline(detected_at);
        SlaSnapshot {
            cert_in_deadline,
            dpb_deadline,
            overdue_cert_in: is_overdue(cert_in_deadline, now),
            overdue_dpb: is_overdue(dpb_deadline, now),
            cert_in_hours_remaining: hours_remaining(cert_in_deadline, now),
            dpb_hours_remaining: hours_remaining(dpb_deadline, now),
        }
    }
}

/// Derived reporting-deadline view of an incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaSnapshot {
    /// When the CERT-In report is due.
    pub cert_in_deadline: Timestamp,
    /// When the DPB report is due.
    pub dpb_deadline: Timestamp,
    /// Whether the CERT-In deadline has passed.
    pub overdue_cert_in: bool,
    /// Whether the DPB deadline has passed.
    pub overdue_dpb: bool,
    /// Whole hours until the CERT-In deadline; negative once overdue.
    pub cert_in_hours_remaining: i64,
    /// Whole hours until the DPB deadline; negative once overdue.
    pub dpb_hours_remaining: i64,
}

/// Whole days until `deadline`, rounded up.
///
/// Positive while the deadline is ahead (any partial day counts as one);
/// negative once passed, with `abs(value)` equal to the number of whole
/// days `now` is past the deadline.
pub fn days_remaining(deadline: Timestamp, now: Timestamp) -> i64 {
    ceil_div(deadline.signed_duration_since(now).num_seconds(), SECS_PER_DAY)
}

/// Whole hours until `deadline`, rounded up. Same sign convention as
/// [`days_remaining`].
pub fn hours_remaining(deadline: Timestamp, now: Timestamp) -> i64 {
    ceil_div(
        deadline.signed_duration_since(now).num_seconds(),
        SECS_PER_HOUR,
    )
}

/// Whether `now` is strictly past `deadline`.
pub fn is_overdue(deadline: Timestamp, now: Timestamp) -> bool {
    now > deadline
}

/// Ceiling division for signed numerators and a positive divisor.
fn ceil_div(n: i64, d: i64) -> i64 {
    (n + d - 1).div_euclid(d)
}

// ─── Tests ───────────────────────────────────────────────────────────
