//! # Breach Incident Lifecycle
//!
//! Models a breach incident from detection through closure.
//!
//! ## States
//!
//! ```text
//! Open ──▶ Investigating ──▶ Contained ──▶ Resolved ──▶ Reported ──▶ Closed
//!                                             │                       ▲
//!                                             └───────────────────────┘
//! ```
//!
//! Transitions are monotonic forward-only through this ordering, one step
//! at a time, with one shortcut: `Resolved → Closed` for incidents that
//! never required a regulatory report. `Reported` is reachable only after
//! a CERT-In report has actually been generated. Backward transitions are
//! never permitted.
//!
//! The two reportability booleans are cached outputs of the reportability
//! policy — recomputed on every relevant field write, never set by direct
//! user input.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use caseflow_core::{Actor, EngineError, IncidentId, IncidentStatus, ReportId, Severity, Timestamp};
use caseflow_policy::{cert_in_required, ReportabilityFlags};

// ─── Point of Contact ────────────────────────────────────────────────

/// The person coordinating the incident response. All fields optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointOfContact {
    /// Contact name.
    pub name: Option<String>,
    /// Contact role (e.g., "DPO", "CISO").
    pub role: Option<String>,
    /// Contact email.
    pub email: Option<String>,
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of an incident status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentTransitionRecord {
    /// Status before the transition.
    pub from_status: IncidentStatus,
    /// Status after the transition.
    pub to_status: IncidentStatus,
    /// Who initiated the transition.
    pub actor: Actor,
    /// When the transition occurred.
    pub timestamp: Timestamp,
}

// ─── Field Patch ─────────────────────────────────────────────────────

/// A partial update to incident fields.
///
/// Absent fields are left untouched. Status changes route through the
/// state machine; the reportability booleans cannot be patched — they are
/// recomputed after every apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New severity.
    pub severity: Option<Severity>,
    /// New estimated occurrence time.
    pub occurred_at: Option<Timestamp>,
    /// Replacement set of affected systems.
    pub affected_systems: Option<BTreeSet<String>>,
    /// Replacement set of exposed PII categories.
    pub pii_categories: Option<BTreeSet<String>>,
    /// New affected-subject count.
    pub affected_data_subject_count: Option<u64>,
    /// New point of contact.
    pub contact: Option<PointOfContact>,
    /// Target lifecycle status.
    pub status: Option<IncidentStatus>,
}

// ─── CERT-In Report ──────────────────────────────────────────────────

/// An immutable CERT-In report payload.
///
/// Bound to the incident's field values at generation time — a later
/// field edit does not retroactively change a generated report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertInReport {
    /// Unique report identifier.
    pub report_id: ReportId,
    /// The incident this report was generated for.
    pub incident_id: IncidentId,
    /// When the report was generated.
    pub generated_at: Timestamp,
    /// Severity at generation time.
    pub severity: Severity,
    /// Category at generation time.
    pub category: String,
    /// Title at generation time.
    pub title: String,
    /// Description at generation time.
    pub description: String,
    /// Detection time.
    pub detected_at: Timestamp,
    /// Estimated occurrence time, if known.
    pub occurred_at: Option<Timestamp>,
    /// Affected systems at generation time.
    pub affected_systems: BTreeSet<String>,
    /// Exposed PII categories at generation time.
    pub pii_categories: BTreeSet<String>,
    /// Affected-subject count at generation time.
    pub affected_data_subject_count: u64,
    /// Point of contact at generation time.
    pub contact: Option<PointOfContact>,
}

// ─── Breach Incident ─────────────────────────────────────────────────

/// A breach incident with its lifecycle state and transition history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreachIncident {
    /// Unique incident identifier.
    pub id: IncidentId,
    /// Short title.
    pub title: String,
    /// Narrative description.
    pub description: String,
    /// Free-form category (e.g., "ransomware", "misdirected-email").
    pub category: String,
    /// Assessed severity.
    pub severity: Severity,
    /// Current lifecycle status.
    pub status: IncidentStatus,
    /// When the breach was discovered. All SLA clocks start here.
    pub detected_at: Timestamp,
    /// Estimated actual occurrence. Informational only.
    pub occurred_at: Option<Timestamp>,
    /// Systems known to be affected.
    pub affected_systems: BTreeSet<String>,
    /// PII categories known to be exposed.
    pub pii_categories: BTreeSet<String>,
    /// Number of data subjects affected.
    pub affected_data_subject_count: u64,
    /// Response coordinator.
    pub contact: Option<PointOfContact>,
    /// Cached output of the reportability policy (CERT-In).
    pub is_reportable_cert_in: bool,
    /// Cached output of the reportability policy (DPB).
    pub is_reportable_dpb: bool,
    /// Whether a CERT-In report has been generated. Gates `Reported`.
    pub report_generated: bool,
    /// When the incident record was created.
    pub created_at: Timestamp,
    /// When the incident record last changed.
    pub updated_at: Timestamp,
    /// Ordered log of all status transitions.
    pub transitions: Vec<IncidentTransitionRecord>,
}

impl BreachIncident {
    /// Record a new incident in `Open`, with reportability evaluated from
    /// the initial field values.
    ///
    /// # Errors
    ///
    /// [`EngineError::Validation`] if the title is empty.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: IncidentId,
        title: String,
        description: String,
        category: String,
        severity: Severity,
        detected_at: Timestamp,
        occurred_at: Option<Timestamp>,
        affected_systems: BTreeSet<String>,
        pii_categories: BTreeSet<String>,
        affected_data_subject_count: u64,
        contact: Option<PointOfContact>,
        now: Timestamp,
    ) -> Result<Self, EngineError> {
        if title.trim().is_empty() {
            return Err(EngineError::validation("incident title must not be empty"));
        }
        let flags =
            ReportabilityFlags::evaluate(severity, &pii_categories, affected_data_subject_count);
        Ok(Self {
            id,
            title,
            description,
            category,
            severity,
            status: IncidentStatus::Open,
            detected_at,
            occurred_at,
            affected_systems,
            pii_categories,
            affected_data_subject_count,
            contact,
            is_reportable_cert_in: flags.cert_in,
            is_reportable_dpb: flags.dpb,
            report_generated: false,
            created_at: now,
            updated_at: now,
            transitions: Vec::new(),
        })
    }

    /// Move the incident forward to `to`.
    ///
    /// Legal moves are one step forward in the ordering, plus
    /// `Resolved → Closed`. `Reported` additionally requires that a
    /// CERT-In report has been generated.
    pub fn transition_to(
        &mut self,
        to: IncidentStatus,
        actor: &Actor,
        now: Timestamp,
    ) -> Result<(), EngineError> {
        let from = self.status;
        let step_forward = to.ordinal() == from.ordinal() + 1;
        let close_from_resolved =
            from == IncidentStatus::Resolved && to == IncidentStatus::Closed;
        if !(step_forward || close_from_resolved) {
            return Err(EngineError::invalid_transition("incident", from, to));
        }
        if to == IncidentStatus::Reported && !self.report_generated {
            return Err(EngineError::invalid_transition("incident", from, to));
        }
        self.do_transition(to, actor, now);
        Ok(())
    }

    /// Apply a partial field update, recomputing reportability afterward.
    ///
    /// A status change in the patch routes through [`Self::transition_to`]
    /// and is applied after the field updates, so reportability reflects
    /// the patched values.
    pub fn apply_patch(
        &mut self,
        patch: IncidentPatch,
        actor: &Actor,
        now: Timestamp,
    ) -> Result<(), EngineError> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(EngineError::validation("incident title must not be empty"));
            }
        }
        let IncidentPatch {
            title,
            description,
            category,
            severity,
            occurred_at,
            affected_systems,
            pii_categories,
            affected_data_subject_count,
            contact,
            status,
        } = patch;
        if let Some(v) = title {
            self.title = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = category {
            self.category = v;
        }
        if let Some(v) = severity {
            self.severity = v;
        }
        if let Some(v) = occurred_at {
            self.occurred_at = Some(v);
        }
        if let Some(v) = affected_systems {
            self.affected_systems = v;
        }
        if let Some(v) = pii_categories {
            self.pii_categories = v;
        }
        if let Some(v) = affected_data_subject_count {
            self.affected_data_subject_count = v;
        }
        if let Some(v) = contact {
            self.contact = Some(v);
        }
        self.recompute_reportability();
        self.updated_at = now;
        if let Some(to) = status {
            self.transition_to(to, actor, now)?;
        }
        Ok(())
    }

    /// Generate the immutable CERT-In report payload.
    ///
    /// Valid only when the reportability policy requires CERT-In reporting
    /// for the current severity; fails with [`EngineError::NotReportable`]
    /// otherwise. Generation is what unlocks the `Reported` status.
    pub fn generate_cert_in_report(&mut self, now: Timestamp) -> Result<CertInReport, EngineError> {
        if !cert_in_required(self.severity) {
            return Err(EngineError::NotReportable(format!(
                "CERT-In reporting is not required for severity {}",
                self.severity
            )));
        }
        let report = CertInReport {
            report_id: ReportId::new(),
            incident_id: self.id.clone(),
            generated_at: now,
            severity: self.severity,
            category: self.category.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            detected_at: self.detected_at,
            occurred_at: self.occurred_at,
            affected_systems: self.affected_systems.clone(),
            pii_categories: self.pii_categories.clone(),
            affected_data_subject_count: self.affected_data_subject_count,
            contact: self.contact.clone(),
        };
        self.report_generated = true;
        self.updated_at = now;
        Ok(report)
    }

    /// Whether the incident is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    fn recompute_reportability(&mut self) {
        let flags = ReportabilityFlags::evaluate(
            self.severity,
            &self.pii_categories,
            self.affected_data_subject_count,
        );
        self.is_reportable_cert_in = flags.cert_in;
        self.is_reportable_dpb = flags.dpb;
    }

    fn do_transition(&mut self, to: IncidentStatus, actor: &Actor, now: Timestamp) {
        self.transitions.push(IncidentTransitionRecord {
            from_status: self.status,
            to_status: to,
            actor: actor.clone(),
            timestamp: now,
        });
        self.status = to;
        self.updated_at = now;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn responder() -> Actor {
        Actor::new("irt-lead")
    }

    fn categories(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn make_incident(severity: Severity, pii: &[&str], count: u64) -> BreachIncident {
        BreachIncident::new(
            IncidentId::new(),
            "Credential stuffing on customer portal".to_string(),
            "Automated login attempts exposed account data".to_string(),
            "unauthorized-access".to_string(),
            severity,
            ts("2026-03-01T10:00:00Z"),
            Some(ts("2026-02-28T22:00:00Z")),
            categories(&["portal-frontend"]),
            categories(pii),
            count,
            None,
            ts("2026-03-01T10:30:00Z"),
        )
        .unwrap()
    }

    // ── Creation & reportability ─────────────────────────────────────

    #[test]
    fn test_low_severity_no_pii_not_reportable() {
        let incident = make_incident(Severity::Low, &[], 0);
        assert!(!incident.is_reportable_cert_in);
        assert!(!incident.is_reportable_dpb);
    }

    #[test]
    fn test_critical_with_exposure_reportable_to_both() {
        let incident = make_incident(Severity::Critical, &["EMAIL"], 50);
        assert!(incident.is_reportable_cert_in);
        assert!(incident.is_reportable_dpb);
    }

    #[test]
    fn test_empty_title_rejected() {
        let result = BreachIncident::new(
            IncidentId::new(),
            "".to_string(),
            "x".to_string(),
            "other".to_string(),
            Severity::Low,
            ts("2026-03-01T10:00:00Z"),
            None,
            BTreeSet::new(),
            BTreeSet::new(),
            0,
            None,
            ts("2026-03-01T10:00:00Z"),
        );
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    // ── Forward-only transitions ─────────────────────────────────────

    #[test]
    fn test_full_forward_walk() {
        let mut incident = make_incident(Severity::High, &["EMAIL"], 10);
        let t = ts("2026-03-01T11:00:00Z");
        incident.transition_to(IncidentStatus::Investigating, &responder(), t).unwrap();
        incident.transition_to(IncidentStatus::Contained, &responder(), t).unwrap();
        incident.transition_to(IncidentStatus::Resolved, &responder(), t).unwrap();
        incident.generate_cert_in_report(t).unwrap();
        incident.transition_to(IncidentStatus::Reported, &responder(), t).unwrap();
        incident.transition_to(IncidentStatus::Closed, &responder(), t).unwrap();
        assert!(incident.is_terminal());
        assert_eq!(incident.transitions.len(), 5);
    }

    #[test]
    fn test_closed_reachable_from_resolved() {
        let mut incident = make_incident(Severity::Low, &[], 0);
        let t = ts("2026-03-01T11:00:00Z");
        incident.transition_to(IncidentStatus::Investigating, &responder(), t).unwrap();
        incident.transition_to(IncidentStatus::Contained, &responder(), t).unwrap();
        incident.transition_to(IncidentStatus::Resolved, &responder(), t).unwrap();
        incident.transition_to(IncidentStatus::Closed, &responder(), t).unwrap();
        assert_eq!(incident.status, IncidentStatus::Closed);
    }

    #[test]
    fn test_backward_transition_rejected() {
        let mut incident = make_incident(Severity::High, &["EMAIL"], 10);
        let t = ts("2026-03-01T11:00:00Z");
        incident.transition_to(IncidentStatus::Investigating, &responder(), t).unwrap();
        let result = incident.transition_to(IncidentStatus::Open, &responder(), t);
        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
    }

    #[test]
    fn test_skipping_forward_rejected() {
        let mut incident = make_incident(Severity::High, &["EMAIL"], 10);
        let t = ts("2026-03-01T11:00:00Z");
        let result = incident.transition_to(IncidentStatus::Resolved, &responder(), t);
        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
    }

    #[test]
    fn test_reported_gated_on_generated_report() {
        let mut incident = make_incident(Severity::High, &["EMAIL"], 10);
        let t = ts("2026-03-01T11:00:00Z");
        incident.transition_to(IncidentStatus::Investigating, &responder(), t).unwrap();
        incident.transition_to(IncidentStatus::Contained, &responder(), t).unwrap();
        incident.transition_to(IncidentStatus::Resolved, &responder(), t).unwrap();
        let result = incident.transition_to(IncidentStatus::Reported, &responder(), t);
        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));

        incident.generate_cert_in_report(t).unwrap();
        incident.transition_to(IncidentStatus::Reported, &responder(), t).unwrap();
        assert_eq!(incident.status, IncidentStatus::Reported);
    }

    // ── Field patches & flag recomputation ───────────────────────────

    #[test]
    fn test_severity_patch_recomputes_cert_in_flag() {
        let mut incident = make_incident(Severity::Low, &["EMAIL"], 5);
        assert!(!incident.is_reportable_cert_in);
        incident
            .apply_patch(
                IncidentPatch {
                    severity: Some(Severity::High),
                    ..IncidentPatch::default()
                },
                &responder(),
                ts("2026-03-01T12:00:00Z"),
            )
            .unwrap();
        assert!(incident.is_reportable_cert_in);
        assert!(incident.is_reportable_dpb);
    }

    #[test]
    fn test_clearing_pii_clears_dpb_flag() {
        let mut incident = make_incident(Severity::Critical, &["EMAIL"], 50);
        incident
            .apply_patch(
                IncidentPatch {
                    pii_categories: Some(BTreeSet::new()),
                    ..IncidentPatch::default()
                },
                &responder(),
                ts("2026-03-01T12:00:00Z"),
            )
            .unwrap();
        assert!(!incident.is_reportable_dpb);
        // CERT-In keyed on severity alone.
        assert!(incident.is_reportable_cert_in);
    }

    #[test]
    fn test_patch_with_status_routes_through_machine() {
        let mut incident = make_incident(Severity::Medium, &["EMAIL"], 5);
        incident
            .apply_patch(
                IncidentPatch {
                    status: Some(IncidentStatus::Investigating),
                    ..IncidentPatch::default()
                },
                &responder(),
                ts("2026-03-01T12:00:00Z"),
            )
            .unwrap();
        assert_eq!(incident.status, IncidentStatus::Investigating);

        let result = incident.apply_patch(
            IncidentPatch {
                status: Some(IncidentStatus::Open),
                ..IncidentPatch::default()
            },
            &responder(),
            ts("2026-03-01T12:01:00Z"),
        );
        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
    }

    // ── CERT-In report generation ────────────────────────────────────

    #[test]
    fn test_report_refused_below_threshold() {
        for severity in [Severity::Low, Severity::Medium] {
            let mut incident = make_incident(severity, &["EMAIL"], 50);
            let result = incident.generate_cert_in_report(ts("2026-03-01T12:00:00Z"));
            assert!(matches!(result, Err(EngineError::NotReportable(_))));
            assert!(!incident.report_generated);
        }
    }

    #[test]
    fn test_report_snapshots_fields_at_generation() {
        let mut incident = make_incident(Severity::Critical, &["EMAIL"], 50);
        let report = incident
            .generate_cert_in_report(ts("2026-03-01T12:00:00Z"))
            .unwrap();
        assert_eq!(report.severity, Severity::Critical);
        assert_eq!(report.affected_data_subject_count, 50);

        // A later edit does not retroactively change the generated report.
        incident
            .apply_patch(
                IncidentPatch {
                    affected_data_subject_count: Some(9_000),
                    ..IncidentPatch::default()
                },
                &responder(),
                ts("2026-03-01T13:00:00Z"),
            )
            .unwrap();
        assert_eq!(report.affected_data_subject_count, 50);
    }

    // ── Serialization ────────────────────────────────────────────────

    #[test]
    fn test_serialization_roundtrip() {
        let incident = make_incident(Severity::High, &["EMAIL", "PHONE"], 12);
        let json = serde_json::to_string(&incident).unwrap();
        let parsed: BreachIncident = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, incident);
    }
}
