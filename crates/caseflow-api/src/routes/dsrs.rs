//! # DSR Routes
//!
//! Routes:
//! - POST   /v1/dsrs — Create a data-subject request
//! - GET    /v1/dsrs — List/filter by status, paged
//! - GET    /v1/dsrs/{dsr_id} — Case with tasks and progress
//! - POST   /v1/dsrs/{dsr_id}/approve — Approve and fan out
//! - POST   /v1/dsrs/{dsr_id}/reject — Reject with reason
//! - POST   /v1/dsrs/{dsr_id}/execute — Deferred fan-out
//! - POST   /v1/dsrs/{dsr_id}/verify-identity — Identity proofing passed
//! - POST   /v1/tasks/{task_id}/start — Connector picked a task up
//! - POST   /v1/tasks/{task_id}/outcome — Connector reported an outcome

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use caseflow_case::{DataSubjectRequest, DsrTask, TaskOutcome};
use caseflow_core::{Actor, DsrId, DsrStatus, TaskId};
use caseflow_service::{DsrDetail, DsrFilter, NewDsr, Page};

use crate::error::AppError;
use crate::state::AppState;

/// Router for DSR and task operations.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/dsrs", post(create).get(list))
        .route("/v1/dsrs/{dsr_id}", get(detail))
        .route("/v1/dsrs/{dsr_id}/approve", post(approve))
        .route("/v1/dsrs/{dsr_id}/reject", post(reject))
        .route("/v1/dsrs/{dsr_id}/execute", post(execute))
        .route("/v1/dsrs/{dsr_id}/verify-identity", post(verify_identity))
        .route("/v1/tasks/{task_id}/start", post(start_task))
        .route("/v1/tasks/{task_id}/outcome", post(record_outcome))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    status: Option<DsrStatus>,
    #[serde(default)]
    offset: usize,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ActorBody {
    actor: Option<String>,
}

impl ActorBody {
    fn actor(&self) -> Actor {
        self.actor
            .as_deref()
            .map(Actor::new)
            .unwrap_or_else(Actor::system)
    }
}

#[derive(Debug, Deserialize)]
struct RejectBody {
    reason: String,
    actor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OutcomeBody {
    #[serde(flatten)]
    outcome: TaskOutcome,
    actor: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewDsr>,
) -> Result<(StatusCode, Json<DataSubjectRequest>), AppError> {
    let dsr = state.engine.create_dsr(input)?;
    Ok((StatusCode::CREATED, Json(dsr)))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<DataSubjectRequest>>, AppError> {
    let filter = DsrFilter {
        status: query.status,
    };
    let page = Page {
        offset: query.offset,
        limit: query.limit.unwrap_or_else(|| Page::default().limit),
    };
    Ok(Json(state.engine.list_dsrs(&filter, &page)?))
}

async fn detail(
    State(state): State<AppState>,
    Path(dsr_id): Path<Uuid>,
) -> Result<Json<DsrDetail>, AppError> {
    Ok(Json(state.engine.get_dsr(&DsrId(dsr_id))?))
}

async fn approve(
    State(state): State<AppState>,
    Path(dsr_id): Path<Uuid>,
    Json(body): Json<ActorBody>,
) -> Result<Json<DsrDetail>, AppError> {
    Ok(Json(state.engine.approve_dsr(&DsrId(dsr_id), &body.actor())?))
}

async fn reject(
    State(state): State<AppState>,
    Path(dsr_id): Path<Uuid>,
    Json(body): Json<RejectBody>,
) -> Result<Json<DsrDetail>, AppError> {
    let actor = body
        .actor
        .as_deref()
        .map(Actor::new)
        .unwrap_or_else(Actor::system);
    Ok(Json(
        state.engine.reject_dsr(&DsrId(dsr_id), &body.reason, &actor)?,
    ))
}

async fn execute(
    State(state): State<AppState>,
    Path(dsr_id): Path<Uuid>,
    Json(body): Json<ActorBody>,
) -> Result<Json<DsrDetail>, AppError> {
    Ok(Json(state.engine.execute_dsr(&DsrId(dsr_id), &body.actor())?))
}

async fn verify_identity(
    State(state): State<AppState>,
    Path(dsr_id): Path<Uuid>,
    Json(body): Json<ActorBody>,
) -> Result<Json<DsrDetail>, AppError> {
    Ok(Json(
        state.engine.verify_dsr_identity(&DsrId(dsr_id), &body.actor())?,
    ))
}

async fn start_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    Json(body): Json<ActorBody>,
) -> Result<Json<DsrTask>, AppError> {
    Ok(Json(state.engine.start_task(&TaskId(task_id), &body.actor())?))
}

async fn record_outcome(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    Json(body): Json<OutcomeBody>,
) -> Result<Json<DsrDetail>, AppError> {
    let actor = body
        .actor
        .as_deref()
        .map(Actor::new)
        .unwrap_or_else(Actor::system);
    Ok(Json(state.engine.record_task_outcome(
        &TaskId(task_id),
        body.outcome,
        &actor,
    )?))
}
