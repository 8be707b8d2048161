//! # Registry API Subsystem
//!
//! **Subsystem ID:** 2
//!
//! Read-only HTTP surface over the bridge registry directory, the built
//! relation store, and the event queue journal. One write route exists,
//! `POST /events`, and it is authenticated.
//!
//! ## Routes
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /registry` | root directory listing |
//! | `GET /registry/*path` | listing, raw JSON, `{type:"csv"}` or `{type:"ndjson"}` |
//! | `GET /sync` | ids + manifest + pending events + receipt names |
//! | `GET /relations` | collection sizes |
//! | `GET /relations/:collection/:id` | one store entity |
//! | `GET /health` | liveness |
//! | `POST /events` | `202 {id}` (API key required) |
//!
//! Every error body is `{"error": ..., ...}`; internals never reach clients.
//!
//! ## Path Safety
//!
//! `domain/path.rs` normalizes the decoded request path lexically and rejects
//! anything that climbs above the root **before** the adapter touches disk.
//!
//! ## Module Structure
//!
//! ```text
//! domain/     config, errors, path containment, media decoders, bodies
//! adapters/   registry_fs - all filesystem reads
//! middleware/ tracing spans, API key auth, CORS
//! router.rs   route table + handlers
//! service.rs  listener lifecycle
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod middleware;
pub mod router;
pub mod service;

pub use adapters::RegistryFiles;
pub use domain::config::humantime_serde;
pub use domain::{
    ApiConfig, ApiError, ApiResult, AuthConfig, ConfigError, CorsConfig, HttpConfig, PathsConfig,
    RegistryPath, ServiceError,
};
pub use router::{build_router, AppState};
pub use service::RegistryApiService;
