//! # Route Modules
//!
//! Each module defines an Axum Router for one API surface area. Routers
//! are merged into the application in `crate::router`.

pub mod dsrs;
pub mod incidents;
