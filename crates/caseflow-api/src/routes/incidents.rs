//! # Incident Routes
//!
//! Routes:
//! - POST   /v1/incidents — Record a breach incident
//! - GET    /v1/incidents/{incident_id} — Incident with derived SLA snapshot
//! - PATCH  /v1/incidents/{incident_id} — Field patch (flags recomputed)
//! - POST   /v1/incidents/{incident_id}/status — Forward lifecycle transition
//! - POST   /v1/incidents/{incident_id}/report/cert-in — Generate CERT-In report

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use caseflow_case::{CertInReport, IncidentPatch};
use caseflow_core::{Actor, IncidentId, IncidentStatus};
use caseflow_service::{IncidentDetail, NewIncident};

use crate::error::AppError;
use crate::state::AppState;

/// Router for incident operations.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/incidents", post(create))
        .route("/v1/incidents/{incident_id}", get(detail).patch(update))
        .route("/v1/incidents/{incident_id}/status", post(transition))
        .route(
            "/v1/incidents/{incident_id}/report/cert-in",
            post(generate_cert_in),
        )
}

#[derive(Debug, Deserialize)]
struct PatchBody {
    #[serde(flatten)]
    patch: IncidentPatch,
    actor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: IncidentStatus,
    actor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActorBody {
    actor: Option<String>,
}

fn actor_or_system(name: &Option<String>) -> Actor {
    name.as_deref().map(Actor::new).unwrap_or_else(Actor::system)
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewIncident>,
) -> Result<(StatusCode, Json<IncidentDetail>), AppError> {
    Ok((StatusCode::CREATED, Json(state.engine.create_incident(input)?)))
}

async fn detail(
    State(state): State<AppState>,
    Path(incident_id): Path<Uuid>,
) -> Result<Json<IncidentDetail>, AppError> {
    Ok(Json(state.engine.get_incident(&IncidentId(incident_id))?))
}

async fn update(
    State(state): State<AppState>,
    Path(incident_id): Path<Uuid>,
    Json(body): Json<PatchBody>,
) -> Result<Json<IncidentDetail>, AppError> {
    let actor = actor_or_system(&body.actor);
    Ok(Json(state.engine.update_incident(
        &IncidentId(incident_id),
        body.patch,
        &actor,
    )?))
}

async fn transition(
    State(state): State<AppState>,
    Path(incident_id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> Result<Json<IncidentDetail>, AppError> {
    let actor = actor_or_system(&body.actor);
    Ok(Json(state.engine.transition_incident(
        &IncidentId(incident_id),
        body.status,
        &actor,
    )?))
}

async fn generate_cert_in(
    State(state): State<AppState>,
    Path(incident_id): Path<Uuid>,
    Json(body): Json<ActorBody>,
) -> Result<(StatusCode, Json<CertInReport>), AppError> {
    let actor = actor_or_system(&body.actor);
    let report = state
        .engine
        .generate_cert_in_report(&IncidentId(incident_id), &actor)?;
    Ok((StatusCode::CREATED, Json(report)))
}
