//! # In-Memory Reference Collaborators
//!
//! HashMap-backed implementations of the store traits, plus recording
//! audit/notification sinks. These are the reference implementations the
//! integration tests and the demo server run against; a production
//! deployment substitutes its own store adapters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use caseflow_case::{BreachIncident, DataSubjectRequest, DsrTask};
use caseflow_core::{DataSourceId, DsrId, EngineError, IncidentId, TaskId, TenantId};

use crate::store::{
    AuditSink, CaseNotification, CaseStore, DsrFilter, NotificationDispatcher, NotificationError,
    Page, ScopeProvider, TaskStore, TransitionEvent, Versioned,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

// ─── Case Store ──────────────────────────────────────────────────────

/// In-memory case store with optimistic versioning.
#[derive(Debug, Default)]
pub struct MemoryCaseStore {
    dsrs: Mutex<HashMap<DsrId, Versioned<DataSubjectRequest>>>,
    incidents: Mutex<HashMap<IncidentId, Versioned<BreachIncident>>>,
}

impl MemoryCaseStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CaseStore for MemoryCaseStore {
    fn insert_dsr(&self, dsr: DataSubjectRequest) -> Result<(), EngineError> {
        lock(&self.dsrs).insert(
            dsr.id.clone(),
            Versioned {
                record: dsr,
                version: 1,
            },
        );
        Ok(())
    }

    fn load_dsr(&self, id: &DsrId) -> Result<Versioned<DataSubjectRequest>, EngineError> {
        lock(&self.dsrs)
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound {
                kind: "dsr",
                id: id.to_string(),
            })
    }

    fn save_dsr(
        &self,
        dsr: &DataSubjectRequest,
        expected_version: u64,
    ) -> Result<u64, EngineError> {
        let mut dsrs = lock(&self.dsrs);
        let entry = dsrs.get_mut(&dsr.id).ok_or_else(|| EngineError::NotFound {
            kind: "dsr",
            id: dsr.id.to_string(),
        })?;
        if entry.version != expected_version {
            return Err(EngineError::ConcurrentModification {
                kind: "dsr",
                id: dsr.id.to_string(),
            });
        }
        entry.record = dsr.clone();
        entry.version += 1;
        Ok(entry.version)
    }

    fn list_dsrs(
        &self,
        filter: &DsrFilter,
        page: &Page,
    ) -> Result<Vec<DataSubjectRequest>, EngineError> {
        let dsrs = lock(&self.dsrs);
        let mut matching: Vec<DataSubjectRequest> = dsrs
            .values()
            .map(|v| v.record.clone())
            .filter(|d| filter.status.map_or(true, |s| d.status == s))
            .collect();
        // Newest first; id as a stable tiebreak for equal timestamps.
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
        });
        Ok(matching
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect())
    }

    fn insert_incident(&self, incident: BreachIncident) -> Result<(), EngineError> {
        lock(&self.incidents).insert(
            incident.id.clone(),
            Versioned {
                record: incident,
                version: 1,
            },
        );
        Ok(())
    }

    fn load_incident(&self, id: &IncidentId) -> Result<Versioned<BreachIncident>, EngineError> {
        lock(&self.incidents)
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound {
                kind: "incident",
                id: id.to_string(),
            })
    }

    fn save_incident(
        &self,
        incident: &BreachIncident,
        expected_version: u64,
    ) -> Result<u64, EngineError> {
        let mut incidents = lock(&self.incidents);
        let entry = incidents
            .get_mut(&incident.id)
            .ok_or_else(|| EngineError::NotFound {
                kind: "incident",
                id: incident.id.to_string(),
            })?;
        if entry.version != expected_version {
            return Err(EngineError::ConcurrentModification {
                kind: "incident",
                id: incident.id.to_string(),
            });
        }
        entry.record = incident.clone();
        entry.version += 1;
        Ok(entry.version)
    }
}

// ─── Task Store ──────────────────────────────────────────────────────

/// In-memory task store. Batches replace per owning DSR.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    by_dsr: Mutex<HashMap<DsrId, Vec<TaskId>>>,
    tasks: Mutex<HashMap<TaskId, Versioned<DsrTask>>>,
}

impl MemoryTaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStore for MemoryTaskStore {
    fn insert_batch(&self, batch: &[DsrTask]) -> Result<(), EngineError> {
        let Some(first) = batch.first() else {
            return Ok(());
        };
        let dsr_id = first.dsr_id.clone();
        let mut by_dsr = lock(&self.by_dsr);
        let mut tasks = lock(&self.tasks);
        if let Some(previous) = by_dsr.remove(&dsr_id) {
            for id in previous {
                tasks.remove(&id);
            }
        }
        let mut ids = Vec::with_capacity(batch.len());
        for task in batch {
            ids.push(task.id.clone());
            tasks.insert(
                task.id.clone(),
                Versioned {
                    record: task.clone(),
                    version: 1,
                },
            );
        }
        by_dsr.insert(dsr_id, ids);
        Ok(())
    }

    fn tasks_for_dsr(&self, dsr_id: &DsrId) -> Result<Vec<DsrTask>, EngineError> {
        let by_dsr = lock(&self.by_dsr);
        let tasks = lock(&self.tasks);
        let ids = by_dsr.get(dsr_id).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| tasks.get(id).map(|v| v.record.clone()))
            .collect())
    }

    fn load_task(&self, id: &TaskId) -> Result<Versioned<DsrTask>, EngineError> {
        lock(&self.tasks)
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound {
                kind: "task",
                id: id.to_string(),
            })
    }

    fn update_task(&self, task: &DsrTask, expected_version: u64) -> Result<u64, EngineError> {
        let mut tasks = lock(&self.tasks);
        let entry = tasks.get_mut(&task.id).ok_or_else(|| EngineError::NotFound {
            kind: "task",
            id: task.id.to_string(),
        })?;
        if entry.version != expected_version {
            return Err(EngineError::ConcurrentModification {
                kind: "task",
                id: task.id.to_string(),
            });
        }
        entry.record = task.clone();
        entry.version += 1;
        Ok(entry.version)
    }
}

// ─── Scope Provider ──────────────────────────────────────────────────

/// Scope provider backed by a fixed per-tenant map with a default set.
///
/// Tenants absent from the map fall back to the default sources.
#[derive(Debug, Default)]
pub struct StaticScopeProvider {
    default_sources: Vec<DataSourceId>,
    per_tenant: HashMap<TenantId, Vec<DataSourceId>>,
}

impl StaticScopeProvider {
    /// Provider returning `sources` for every tenant.
    pub fn new(sources: Vec<DataSourceId>) -> Self {
        Self {
            default_sources: sources,
            per_tenant: HashMap::new(),
        }
    }

    /// Override the scope for one tenant.
    pub fn with_tenant(mut self, tenant: TenantId, sources: Vec<DataSourceId>) -> Self {
        self.per_tenant.insert(tenant, sources);
        self
    }
}

impl ScopeProvider for StaticScopeProvider {
    fn sources_in_scope(&self, tenant: &TenantId) -> Result<Vec<DataSourceId>, EngineError> {
        Ok(self
            .per_tenant
            .get(tenant)
            .unwrap_or(&self.default_sources)
            .clone())
    }
}

// ─── Audit Sinks ─────────────────────────────────────────────────────

/// Audit sink that keeps every event in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<TransitionEvent>>,
}

impl RecordingAuditSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events.
    pub fn events(&self) -> Vec<TransitionEvent> {
        lock(&self.events).clone()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: TransitionEvent) {
        lock(&self.events).push(event);
    }
}

/// Audit sink that logs events through `tracing`.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: TransitionEvent) {
        tracing::info!(
            entity = %event.entity,
            entity_id = %event.entity_id,
            old_status = %event.old_status,
            new_status = %event.new_status,
            actor = %event.actor,
            timestamp = %event.timestamp,
            "case transition"
        );
    }
}

// ─── Notification Dispatchers ────────────────────────────────────────

/// Dispatcher that records notices in memory; can be told to fail, for
/// exercising the fire-and-forget contract.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<CaseNotification>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    /// Create a dispatcher that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent dispatch fail.
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Snapshot of all accepted notices.
    pub fn sent(&self) -> Vec<CaseNotification> {
        lock(&self.sent).clone()
    }
}

impl NotificationDispatcher for RecordingNotifier {
    fn dispatch(&self, notification: CaseNotification) -> Result<(), NotificationError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationError("dispatcher offline".to_string()));
        }
        lock(&self.sent).push(notification);
        Ok(())
    }
}

/// Dispatcher that logs notices through `tracing`.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl NotificationDispatcher for TracingNotifier {
    fn dispatch(&self, notification: CaseNotification) -> Result<(), NotificationError> {
        tracing::info!(?notification, "terminal transition notice");
        Ok(())
    }
}
