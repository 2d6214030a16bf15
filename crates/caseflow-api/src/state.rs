//! # Application State
//!
//! Shared state for the Axum application: the case service façade the
//! route handlers delegate to.

use std::sync::Arc;

use caseflow_service::CaseService;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// The compliance case engine.
    pub engine: Arc<CaseService>,
}

impl AppState {
    /// Wrap an assembled engine.
    pub fn new(engine: Arc<CaseService>) -> Self {
        Self { engine }
    }
}
