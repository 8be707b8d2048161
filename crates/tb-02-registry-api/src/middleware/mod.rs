//! Middleware for the registry API.
//!
//! Layer order: Request → CORS → Tracing → Router → (Auth on `POST /events`) → Handler

pub mod auth;
pub mod cors;
pub mod tracing;

pub use auth::{constant_time_compare, AuthLayer};
pub use cors::create_cors_layer;
pub use tracing::TracingLayer;
