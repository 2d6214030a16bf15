//! # Progress Aggregator
//!
//! Computes the 0–100 completion estimate the UI shows for a DSR. This is
//! a display estimate, not a correctness-critical value, but the engine is
//! its only producer so every screen reports the same number.

use caseflow_core::DsrStatus;

use crate::dsr::DataSubjectRequest;
use crate::task::DsrTask;

/// Progress reported for an `InProgress` DSR whose task batch has not
/// landed yet.
///
/// An explicit placeholder, not a derived measurement: it signals
/// "fan-out pending" between the case commit and the task batch becoming
/// visible. Inherited from the system this engine replaces.
pub const FANOUT_PENDING_PROGRESS: u8 = 50;

/// Progress shown while a case awaits officer review or identity proofing.
const INTAKE_PROGRESS: u8 = 0;

/// Progress shown for an approved case whose fan-out has not started.
const APPROVED_PROGRESS: u8 = 10;

/// The 0–100 completion estimate for `dsr` given its current task set.
///
/// Terminal cases report 100 except `Rejected`, which never executed.
/// While in progress the estimate is the share of tasks that reached
/// COMPLETED or VERIFIED, rounded to the nearest whole percent.
pub fn progress(dsr: &DataSubjectRequest, tasks: &[DsrTask]) -> u8 {
    match dsr.status {
        DsrStatus::IdentityVerification | DsrStatus::Pending | DsrStatus::Rejected => {
            INTAKE_PROGRESS
        }
        DsrStatus::Approved => APPROVED_PROGRESS,
        DsrStatus::Completed | DsrStatus::Failed => 100,
        DsrStatus::InProgress => {
            if tasks.is_empty() {
                return FANOUT_PENDING_PROGRESS;
            }
            let done = tasks.iter().filter(|t| t.status.is_success()).count();
            let total = tasks.len();
            ((100 * done + total / 2) / total) as u8
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use caseflow_core::{
        Actor, DataSourceId, DsrId, Priority, RequestType, TenantId, Timestamp,
    };

    use super::*;
    use crate::dsr::SubjectIdentity;
    use crate::task::TaskOutcome;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn make_dsr() -> DataSubjectRequest {
        DataSubjectRequest::new(
            DsrId::new(),
            TenantId::new("acme"),
            RequestType::Access,
            SubjectIdentity {
                name: "Asha Rao".to_string(),
                contact: "asha.rao@example.com".to_string(),
                identifiers: BTreeMap::new(),
            },
            Priority::High,
            false,
            ts("2026-03-04T09:00:00Z"),
            ts("2026-03-01T09:00:00Z"),
        )
        .unwrap()
    }

    fn make_tasks(dsr: &DataSubjectRequest, n: usize) -> Vec<DsrTask> {
        (0..n)
            .map(|i| {
                DsrTask::new(
                    dsr.id.clone(),
                    DataSourceId::new(format!("ds-{i:02}")),
                    RequestType::Access,
                    ts("2026-03-01T10:00:00Z"),
                )
            })
            .collect()
    }

    #[test]
    fn test_fixed_stage_values() {
        let mut dsr = make_dsr();
        assert_eq!(progress(&dsr, &[]), 0);
        dsr.approve(&Actor::system(), ts("2026-03-01T10:00:00Z")).unwrap();
        assert_eq!(progress(&dsr, &[]), 10);
    }

    #[test]
    fn test_rejected_reports_zero() {
        let mut dsr = make_dsr();
        dsr.reject("duplicate", &Actor::system(), ts("2026-03-01T10:00:00Z")).unwrap();
        assert_eq!(progress(&dsr, &[]), 0);
    }

    #[test]
    fn test_in_progress_ratio() {
        let mut dsr = make_dsr();
        dsr.approve(&Actor::system(), ts("2026-03-01T10:00:00Z")).unwrap();
        dsr.begin_execution(&Actor::system(), ts("2026-03-01T10:00:00Z")).unwrap();
        let mut tasks = make_tasks(&dsr, 2);
        assert_eq!(progress(&dsr, &tasks), 0);

        tasks[0]
            .record_outcome(
                TaskOutcome::Completed {
                    result: serde_json::Value::Null,
                },
                ts("2026-03-01T11:00:00Z"),
            )
            .unwrap();
        assert_eq!(progress(&dsr, &tasks), 50);
    }

    #[test]
    fn test_failed_tasks_do_not_count_toward_ratio() {
        let mut dsr = make_dsr();
        dsr.approve(&Actor::system(), ts("2026-03-01T10:00:00Z")).unwrap();
        dsr.begin_execution(&Actor::system(), ts("2026-03-01T10:00:00Z")).unwrap();
        let mut tasks = make_tasks(&dsr, 3);
        tasks[0]
            .record_outcome(
                TaskOutcome::Failed {
                    error: "unreachable".to_string(),
                },
                ts("2026-03-01T11:00:00Z"),
            )
            .unwrap();
        tasks[1]
            .record_outcome(
                TaskOutcome::Verified {
                    result: serde_json::Value::Null,
                },
                ts("2026-03-01T11:00:00Z"),
            )
            .unwrap();
        // 1 of 3 succeeded: round(33.3) = 33.
        assert_eq!(progress(&dsr, &tasks), 33);
    }

    // Placeholder policy, not a derived measurement.
    #[test]
    fn test_fanout_pending_placeholder() {
        let mut dsr = make_dsr();
        dsr.approve(&Actor::system(), ts("2026-03-01T10:00:00Z")).unwrap();
        dsr.begin_execution(&Actor::system(), ts("2026-03-01T10:00:00Z")).unwrap();
        assert_eq!(progress(&dsr, &[]), FANOUT_PENDING_PROGRESS);
    }

    #[test]
    fn test_terminal_values() {
        let mut dsr = make_dsr();
        dsr.approve(&Actor::system(), ts("2026-03-01T10:00:00Z")).unwrap();
        dsr.begin_execution(&Actor::system(), ts("2026-03-01T10:00:00Z")).unwrap();
        let mut completed = dsr.clone();
        completed.complete(&Actor::system(), ts("2026-03-02T09:00:00Z")).unwrap();
        assert_eq!(progress(&completed, &[]), 100);

        let mut failed = dsr;
        failed.fail(&Actor::system(), ts("2026-03-02T09:00:00Z")).unwrap();
        assert_eq!(progress(&failed, &[]), 100);
    }

    // Monotonic as tasks move toward terminal statuses: once a DSR is
    // executing, the estimate never drops.
    #[test]
    fn test_monotonic_as_tasks_advance() {
        let mut dsr = make_dsr();
        dsr.approve(&Actor::system(), ts("2026-03-01T10:00:00Z")).unwrap();
        dsr.begin_execution(&Actor::system(), ts("2026-03-01T10:00:00Z")).unwrap();
        let mut tasks = make_tasks(&dsr, 4);
        let mut readings = vec![progress(&dsr, &tasks)];

        for i in 0..4 {
            tasks[i]
                .record_outcome(
                    TaskOutcome::Completed {
                        result: serde_json::Value::Null,
                    },
                    ts("2026-03-01T12:00:00Z"),
                )
                .unwrap();
            readings.push(progress(&dsr, &tasks));
        }

        dsr.complete(&Actor::system(), ts("2026-03-01T13:00:00Z")).unwrap();
        readings.push(progress(&dsr, &tasks));

        for pair in readings.windows(2) {
            assert!(pair[0] <= pair[1], "progress regressed: {readings:?}");
        }
        assert_eq!(*readings.last().unwrap(), 100);
    }
}
