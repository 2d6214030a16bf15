//! # caseflow-api — Axum API Surface
//!
//! The HTTP layer over the Caseflow engine, built on Axum/Tower. Exposes
//! the operations the compliance UI consumes:
//!
//! - `/v1/dsrs/*` — DSR intake, review, fan-out, and task outcomes
//! - `/v1/incidents/*` — incident recording, lifecycle, SLA snapshots,
//!   and CERT-In report generation
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers — everything delegates to
//!   `caseflow_service::CaseService`.
//! - All errors map to structured HTTP responses via `AppError`, with a
//!   `retryable` flag mirroring the engine's retry contract.

pub mod error;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use state::AppState;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Assemble the application router with shared middleware.
pub fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .merge(routes::dsrs::router())
        .merge(routes::incidents::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
