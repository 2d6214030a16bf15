//! # Case Service Façade
//!
//! Orchestrates the state machines, policies, fan-out, and progress
//! roll-up against the case and task stores. This is the surface the UI
//! layer consumes; no business logic lives above it.
//!
//! ## Concurrency
//!
//! Every public operation executes as a single unit against the stores.
//! Operations on the same case id are serialized through a per-case lock
//! table; operations on different ids proceed in parallel with no global
//! lock. Mutations happen on a loaded copy and commit with one versioned
//! save — a failed operation leaves no partial update behind.
//!
//! Fan-out batches are written before the case commit: fan-out is
//! deterministic and `TaskStore::insert_batch` replaces per DSR, so a
//! retried approval after a failed commit rewrites the same batch instead
//! of duplicating it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use caseflow_case::{
    fanout, progress, BreachIncident, CertInReport, DataSubjectRequest, DsrTask, IncidentPatch,
    SubjectIdentity, TaskOutcome,
};
use caseflow_core::{
    Actor, Clock, DsrId, DsrStatus, EngineError, IncidentId, IncidentStatus, Priority,
    RequestType, Severity, TaskId, TenantId, Timestamp,
};
use caseflow_policy::{SlaPolicy, SlaSnapshot};

use crate::store::{
    AuditSink, CaseNotification, CaseStore, DsrFilter, EntityKind, NotificationDispatcher, Page,
    ScopeProvider, TaskStore, TransitionEvent,
};

// ─── Inputs ──────────────────────────────────────────────────────────

/// Input for creating a DSR.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewDsr {
    /// The tenant whose data sources are in scope.
    pub tenant: TenantId,
    /// The right being exercised.
    pub request_type: RequestType,
    /// The data subject.
    pub subject: SubjectIdentity,
    /// Case priority; feeds the SLA window.
    pub priority: Priority,
    /// Whether the request channel requires identity proofing before the
    /// case becomes visible to an officer.
    #[serde(default)]
    pub requires_identity_verification: bool,
}

/// Input for recording a breach incident.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewIncident {
    /// Short title.
    pub title: String,
    /// Narrative description.
    #[serde(default)]
    pub description: String,
    /// Free-form category.
    #[serde(default)]
    pub category: String,
    /// Assessed severity.
    pub severity: Severity,
    /// When the breach was discovered; defaults to now.
    pub detected_at: Option<Timestamp>,
    /// Estimated actual occurrence.
    pub occurred_at: Option<Timestamp>,
    /// Systems known to be affected.
    #[serde(default)]
    pub affected_systems: std::collections::BTreeSet<String>,
    /// PII categories known to be exposed.
    #[serde(default)]
    pub pii_categories: std::collections::BTreeSet<String>,
    /// Number of data subjects affected.
    #[serde(default)]
    pub affected_data_subject_count: u64,
    /// Response coordinator.
    pub contact: Option<caseflow_case::PointOfContact>,
}

// ─── Views ───────────────────────────────────────────────────────────

/// A DSR composed with its tasks and derived progress.
#[derive(Debug, Clone, Serialize)]
pub struct DsrDetail {
    /// The case record.
    pub dsr: DataSubjectRequest,
    /// Tasks owned by the case, in fan-out order.
    pub tasks: Vec<DsrTask>,
    /// Derived 0–100 completion estimate.
    pub progress: u8,
}

/// An incident composed with its derived SLA snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct IncidentDetail {
    /// The incident record.
    pub incident: BreachIncident,
    /// Reporting deadlines and overdue flags at read time.
    pub sla: SlaSnapshot,
}

// ─── Lock Table ──────────────────────────────────────────────────────

/// Per-case locks. Entries are created on first use and kept for the
/// process lifetime — case ids are not unbounded in practice and the
/// table stays small.
#[derive(Default)]
struct CaseLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CaseLocks {
    fn entry(&self, key: String) -> Arc<Mutex<()>> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entry(key).or_default().clone()
    }
}

// ─── Service ─────────────────────────────────────────────────────────

/// The compliance case lifecycle engine.
pub struct CaseService {
    cases: Arc<dyn CaseStore>,
    tasks: Arc<dyn TaskStore>,
    scope: Arc<dyn ScopeProvider>,
    audit: Arc<dyn AuditSink>,
    notifier: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
    sla: SlaPolicy,
    locks: CaseLocks,
}

impl CaseService {
    /// Assemble the engine from its collaborators.
    pub fn new(
        cases: Arc<dyn CaseStore>,
        tasks: Arc<dyn TaskStore>,
        scope: Arc<dyn ScopeProvider>,
        audit: Arc<dyn AuditSink>,
        notifier: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
        sla: SlaPolicy,
    ) -> Self {
        Self {
            cases,
            tasks,
            scope,
            audit,
            notifier,
            clock,
            sla,
            locks: CaseLocks::default(),
        }
    }

    // ── DSR operations ───────────────────────────────────────────────

    /// Create a DSR. The SLA deadline is computed here, once, and stored
    /// on the case.
    pub fn create_dsr(&self, input: NewDsr) -> Result<DataSubjectRequest, EngineError> {
        let now = self.clock.now();
        let deadline = self.sla.dsr_deadline(input.priority, now);
        let dsr = DataSubjectRequest::new(
            DsrId::new(),
            input.tenant,
            input.request_type,
            input.subject,
            input.priority,
            input.requires_identity_verification,
            deadline,
            now,
        )?;
        self.cases.insert_dsr(dsr.clone())?;
        tracing::info!(dsr_id = %dsr.id, request_type = %dsr.request_type, status = %dsr.status, "DSR created");
        Ok(dsr)
    }

    /// Identity proofing succeeded; the case becomes visible to officers.
    pub fn verify_dsr_identity(&self, id: &DsrId, actor: &Actor) -> Result<DsrDetail, EngineError> {
        let lock = self.locks.entry(id.to_string());
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        let now = self.clock.now();

        let loaded = self.cases.load_dsr(id)?;
        let mut dsr = loaded.record;
        let base = dsr.transitions.len();
        dsr.verify_identity(actor, now)?;
        self.cases.save_dsr(&dsr, loaded.version)?;
        self.emit_dsr_transitions(&dsr, base);
        self.dsr_detail(dsr)
    }

    /// Approve a pending DSR and fan it out.
    ///
    /// One task materializes per in-scope data source and the case moves
    /// to `InProgress`; with zero applicable sources it completes
    /// directly.
    pub fn approve_dsr(&self, id: &DsrId, actor: &Actor) -> Result<DsrDetail, EngineError> {
        let lock = self.locks.entry(id.to_string());
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let loaded = self.cases.load_dsr(id)?;
        let mut dsr = loaded.record;
        let now = self.clock.now();
        let base = dsr.transitions.len();
        dsr.approve(actor, now)?;
        self.fan_out(&mut dsr, actor, now)?;
        self.cases.save_dsr(&dsr, loaded.version)?;
        self.emit_dsr_transitions(&dsr, base);
        self.notify_dsr_terminal(&dsr);
        self.dsr_detail(dsr)
    }

    /// Reject a pending DSR with a reason.
    pub fn reject_dsr(
        &self,
        id: &DsrId,
        reason: &str,
        actor: &Actor,
    ) -> Result<DsrDetail, EngineError> {
        let lock = self.locks.entry(id.to_string());
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let loaded = self.cases.load_dsr(id)?;
        let mut dsr = loaded.record;
        let base = dsr.transitions.len();
        dsr.reject(reason, actor, self.clock.now())?;
        self.cases.save_dsr(&dsr, loaded.version)?;
        self.emit_dsr_transitions(&dsr, base);
        self.notify_dsr_terminal(&dsr);
        self.dsr_detail(dsr)
    }

    /// Run deferred fan-out for an approved DSR.
    ///
    /// The tail of [`Self::approve_dsr`], for cases that reached
    /// `Approved` through an intake flow that defers execution.
    pub fn execute_dsr(&self, id: &DsrId, actor: &Actor) -> Result<DsrDetail, EngineError> {
        let lock = self.locks.entry(id.to_string());
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let loaded = self.cases.load_dsr(id)?;
        let mut dsr = loaded.record;
        if dsr.status != DsrStatus::Approved {
            return Err(EngineError::invalid_transition(
                "dsr",
                dsr.status,
                DsrStatus::InProgress,
            ));
        }
        let now = self.clock.now();
        let base = dsr.transitions.len();
        self.fan_out(&mut dsr, actor, now)?;
        self.cases.save_dsr(&dsr, loaded.version)?;
        self.emit_dsr_transitions(&dsr, base);
        self.notify_dsr_terminal(&dsr);
        self.dsr_detail(dsr)
    }

    /// A connector picked a task up.
    pub fn start_task(&self, task_id: &TaskId, actor: &Actor) -> Result<DsrTask, EngineError> {
        let probe = self.tasks.load_task(task_id)?;
        let lock = self.locks.entry(probe.record.dsr_id.to_string());
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let loaded = self.tasks.load_task(task_id)?;
        let mut task = loaded.record;
        let now = self.clock.now();
        let old_status = task.status;
        task.start(now)?;
        self.tasks.update_task(&task, loaded.version)?;
        self.audit.record(TransitionEvent {
            entity: EntityKind::Task,
            entity_id: task.id.to_string(),
            old_status: old_status.to_string(),
            new_status: task.status.to_string(),
            actor: actor.clone(),
            timestamp: now,
        });
        Ok(task)
    }

    /// Record a connector's reported outcome for a task, then re-evaluate
    /// the owning DSR.
    ///
    /// When every task is terminal the case closes: `Completed` if at
    /// least one task succeeded, `Failed` otherwise. With non-terminal
    /// tasks remaining, the case stays `InProgress`.
    pub fn record_task_outcome(
        &self,
        task_id: &TaskId,
        outcome: TaskOutcome,
        actor: &Actor,
    ) -> Result<DsrDetail, EngineError> {
        let probe = self.tasks.load_task(task_id)?;
        let dsr_id = probe.record.dsr_id.clone();
        let lock = self.locks.entry(dsr_id.to_string());
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        let now = self.clock.now();

        let loaded_dsr = self.cases.load_dsr(&dsr_id)?;
        let mut dsr = loaded_dsr.record;
        if dsr.status != DsrStatus::InProgress {
            return Err(EngineError::invalid_transition(
                "dsr",
                dsr.status,
                DsrStatus::InProgress,
            ));
        }

        let loaded_task = self.tasks.load_task(task_id)?;
        let mut task = loaded_task.record;
        let old_status = task.status;
        task.record_outcome(outcome, now)?;
        self.tasks.update_task(&task, loaded_task.version)?;
        self.audit.record(TransitionEvent {
            entity: EntityKind::Task,
            entity_id: task.id.to_string(),
            old_status: old_status.to_string(),
            new_status: task.status.to_string(),
            actor: actor.clone(),
            timestamp: now,
        });

        let all = self.tasks.tasks_for_dsr(&dsr_id)?;
        if all.iter().all(|t| t.status.is_terminal()) {
            let base = dsr.transitions.len();
            if all.iter().any(|t| t.status.is_success()) {
                dsr.complete(&Actor::system(), now)?;
            } else {
                dsr.fail(&Actor::system(), now)?;
            }
            self.cases.save_dsr(&dsr, loaded_dsr.version)?;
            self.emit_dsr_transitions(&dsr, base);
            self.notify_dsr_terminal(&dsr);
        }

        let progress = progress(&dsr, &all);
        Ok(DsrDetail {
            dsr,
            tasks: all,
            progress,
        })
    }

    /// A DSR with its tasks and derived progress.
    pub fn get_dsr(&self, id: &DsrId) -> Result<DsrDetail, EngineError> {
        let loaded = self.cases.load_dsr(id)?;
        self.dsr_detail(loaded.record)
    }

    /// List DSRs matching `filter`, newest first.
    pub fn list_dsrs(
        &self,
        filter: &DsrFilter,
        page: &Page,
    ) -> Result<Vec<DataSubjectRequest>, EngineError> {
        self.cases.list_dsrs(filter, page)
    }

    // ── Incident operations ──────────────────────────────────────────

    /// Record a breach incident. Reportability is evaluated from the
    /// initial field values.
    pub fn create_incident(&self, input: NewIncident) -> Result<IncidentDetail, EngineError> {
        let now = self.clock.now();
        let incident = BreachIncident::new(
            IncidentId::new(),
            input.title,
            input.description,
            input.category,
            input.severity,
            input.detected_at.unwrap_or(now),
            input.occurred_at,
            input.affected_systems,
            input.pii_categories,
            input.affected_data_subject_count,
            input.contact,
            now,
        )?;
        self.cases.insert_incident(incident.clone())?;
        tracing::info!(incident_id = %incident.id, severity = %incident.severity, "incident recorded");
        Ok(self.incident_detail(incident))
    }

    /// Apply a field patch to an incident, recomputing reportability and
    /// routing any status change through the state machine.
    pub fn update_incident(
        &self,
        id: &IncidentId,
        patch: IncidentPatch,
        actor: &Actor,
    ) -> Result<IncidentDetail, EngineError> {
        let lock = self.locks.entry(id.to_string());
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let loaded = self.cases.load_incident(id)?;
        let mut incident = loaded.record;
        let base = incident.transitions.len();
        incident.apply_patch(patch, actor, self.clock.now())?;
        self.cases.save_incident(&incident, loaded.version)?;
        self.emit_incident_transitions(&incident, base);
        Ok(self.incident_detail(incident))
    }

    /// Move an incident forward in its lifecycle.
    pub fn transition_incident(
        &self,
        id: &IncidentId,
        to: IncidentStatus,
        actor: &Actor,
    ) -> Result<IncidentDetail, EngineError> {
        self.update_incident(
            id,
            IncidentPatch {
                status: Some(to),
                ..IncidentPatch::default()
            },
            actor,
        )
    }

    /// An incident with its derived SLA snapshot at read time.
    pub fn get_incident(&self, id: &IncidentId) -> Result<IncidentDetail, EngineError> {
        let loaded = self.cases.load_incident(id)?;
        Ok(self.incident_detail(loaded.record))
    }

    /// Generate the immutable CERT-In report for an incident.
    ///
    /// Fails with [`EngineError::NotReportable`] below the severity
    /// threshold. Generation unlocks the `Reported` status; moving there
    /// remains a separate transition.
    pub fn generate_cert_in_report(
        &self,
        id: &IncidentId,
        actor: &Actor,
    ) -> Result<CertInReport, EngineError> {
        let lock = self.locks.entry(id.to_string());
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let loaded = self.cases.load_incident(id)?;
        let mut incident = loaded.record;
        let report = incident.generate_cert_in_report(self.clock.now())?;
        self.cases.save_incident(&incident, loaded.version)?;
        tracing::info!(incident_id = %incident.id, report_id = %report.report_id, actor = %actor, "CERT-In report generated");
        Ok(report)
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Materialize and persist the task batch, then advance the case.
    /// Requires `Approved`.
    fn fan_out(
        &self,
        dsr: &mut DataSubjectRequest,
        actor: &Actor,
        now: Timestamp,
    ) -> Result<(), EngineError> {
        let sources = self.scope.sources_in_scope(&dsr.tenant)?;
        let batch = fanout::resolve(dsr, &sources, now);
        if batch.is_empty() {
            dsr.complete(actor, now)?;
        } else {
            self.tasks.insert_batch(&batch)?;
            dsr.begin_execution(actor, now)?;
        }
        Ok(())
    }

    fn dsr_detail(&self, dsr: DataSubjectRequest) -> Result<DsrDetail, EngineError> {
        let tasks = self.tasks.tasks_for_dsr(&dsr.id)?;
        let progress = progress(&dsr, &tasks);
        Ok(DsrDetail {
            dsr,
            tasks,
            progress,
        })
    }

    fn incident_detail(&self, incident: BreachIncident) -> IncidentDetail {
        let sla = self
            .sla
            .incident_snapshot(incident.detected_at, self.clock.now());
        IncidentDetail { incident, sla }
    }

    fn emit_dsr_transitions(&self, dsr: &DataSubjectRequest, from_index: usize) {
        for record in &dsr.transitions[from_index..] {
            self.audit.record(TransitionEvent {
                entity: EntityKind::Dsr,
                entity_id: dsr.id.to_string(),
                old_status: record.from_status.to_string(),
                new_status: record.to_status.to_string(),
                actor: record.actor.clone(),
                timestamp: record.timestamp,
            });
        }
    }

    fn emit_incident_transitions(&self, incident: &BreachIncident, from_index: usize) {
        for record in &incident.transitions[from_index..] {
            self.audit.record(TransitionEvent {
                entity: EntityKind::Incident,
                entity_id: incident.id.to_string(),
                old_status: record.from_status.to_string(),
                new_status: record.to_status.to_string(),
                actor: record.actor.clone(),
                timestamp: record.timestamp,
            });
            match record.to_status {
                IncidentStatus::Reported => self.notify(CaseNotification::IncidentReported {
                    incident_id: incident.id.clone(),
                }),
                IncidentStatus::Closed => self.notify(CaseNotification::IncidentClosed {
                    incident_id: incident.id.clone(),
                }),
                _ => {}
            }
        }
    }

    fn notify_dsr_terminal(&self, dsr: &DataSubjectRequest) {
        let notification = match dsr.status {
            DsrStatus::Completed => CaseNotification::DsrCompleted {
                dsr_id: dsr.id.clone(),
            },
            DsrStatus::Rejected => CaseNotification::DsrRejected {
                dsr_id: dsr.id.clone(),
            },
            DsrStatus::Failed => CaseNotification::DsrFailed {
                dsr_id: dsr.id.clone(),
            },
            _ => return,
        };
        self.notify(notification);
    }

    /// Fire-and-forget: a failed dispatch is logged and dropped, never
    /// propagated into the transition that triggered it.
    fn notify(&self, notification: CaseNotification) {
        if let Err(e) = self.notifier.dispatch(notification) {
            tracing::warn!(error = %e, "notification dispatch failed; transition unaffected");
        }
    }
}
