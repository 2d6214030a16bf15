//! # Task Fan-out Resolver
//!
//! Decomposes an approved DSR into one task per in-scope data source.
//! Scope membership is an external input (the tenant's scope provider),
//! not computed here.
//!
//! Determinism invariant: the same DSR and the same scope set yield task
//! lists identical in membership and order — tasks are ordered by
//! ascending `data_source_id` and duplicate sources collapse. Retries and
//! replays therefore never silently duplicate or reorder tasks.

use caseflow_core::{DataSourceId, Timestamp};

use crate::dsr::DataSubjectRequest;
use crate::task::DsrTask;

/// Materialize the task set for `dsr` against the in-scope data sources.
///
/// Access/erasure/correction/portability requests produce one task per
/// source; nomination and grievance requests are pure case records and
/// produce none.
pub fn resolve(
    dsr: &DataSubjectRequest,
    data_sources_in_scope: &[DataSourceId],
    now: Timestamp,
) -> Vec<DsrTask> {
    if !dsr.request_type.executes_against_sources() {
        return Vec::new();
    }
    let mut sources: Vec<DataSourceId> = data_sources_in_scope.to_vec();
    sources.sort();
    sources.dedup();
    sources
        .into_iter()
        .map(|source| DsrTask::new(dsr.id.clone(), source, dsr.request_type, now))
        .collect()
}
