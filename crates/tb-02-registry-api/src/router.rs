//! Route table and handlers.

use crate::adapters::RegistryFiles;
use crate::domain::{ApiConfig, ApiError, ApiResult, EventAccepted, RegistryBody, RegistryPath, SyncSnapshot};
use crate::middleware::{create_cors_layer, AuthLayer, TracingLayer};
use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared_bus::EventPublisher;
use shared_types::EventDraft;
use std::any::Any;
use std::sync::Arc;
use tb_01_relation_registry::RegistryReader;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{error, info, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn RegistryReader>,
    pub publisher: Arc<dyn EventPublisher>,
    pub files: RegistryFiles,
}

impl AppState {
    pub fn new(
        registry: Arc<dyn RegistryReader>,
        publisher: Arc<dyn EventPublisher>,
        config: &ApiConfig,
    ) -> Self {
        Self {
            registry,
            publisher,
            files: RegistryFiles::new(&config.paths),
        }
    }
}

/// Build the full HTTP router.
///
/// `POST /events` is only mounted when `config.auth` enables ingestion, and
/// is always behind `AuthLayer`.
pub fn build_router(state: AppState, config: &ApiConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/registry", get(registry_root))
        .route("/registry/", get(registry_root))
        .route("/registry/*path", get(registry_entry))
        .route("/sync", get(sync_snapshot))
        .route("/relations", get(relation_stats))
        .route("/relations/:collection/:id", get(relation_entity));

    if config.auth.events_enabled() {
        let events = Router::new()
            .route("/events", post(enqueue_event))
            .route_layer(AuthLayer::new(config.auth.api_key.clone()));
        router = router.merge(events);
    } else {
        info!("Event ingestion disabled (no API key configured)");
    }

    router
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TracingLayer::new())
        .layer(create_cors_layer(&config.cors))
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "registry-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn registry_root(State(state): State<AppState>) -> ApiResult<Json<RegistryBody>> {
    state.files.entry(&RegistryPath::root()).await.map(Json)
}

/// `path` arrives percent-decoded, so `%2e%2e` is checked as `..`.
async fn registry_entry(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<RegistryBody>> {
    let Path(raw) = path.map_err(|_| ApiError::invalid_path())?;
    let resolved = RegistryPath::resolve(&raw).map_err(|e| {
        warn!(path = %raw, error = %e, "Rejected registry path");
        ApiError::invalid_path()
    })?;
    state.files.entry(&resolved).await.map(Json)
}

async fn sync_snapshot(State(state): State<AppState>) -> Json<SyncSnapshot> {
    Json(state.files.sync_snapshot().await)
}

async fn relation_stats(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "collections": state.registry.stats(),
        "hasIds": state.registry.source_document().is_some(),
    }))
}

async fn relation_entity(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let registry = &state.registry;
    let entity = match collection.as_str() {
        "nodes" => registry.get_node(&id).map(serde_json::to_value),
        "rooms" => registry.get_room(&id).map(serde_json::to_value),
        "chapels" => registry.get_chapel(&id).map(serde_json::to_value),
        "arcana" => registry.get_arcana(&id).map(serde_json::to_value),
        "shem" => registry.get_shem(&id).map(serde_json::to_value),
        _ => return Err(ApiError::not_found()),
    };

    match entity {
        Some(Ok(value)) => Ok(Json(value)),
        Some(Err(e)) => {
            error!(collection = %collection, id = %id, error = %e, "Entity serialization failed");
            Err(ApiError::internal())
        }
        None => Err(ApiError::not_found()
            .with_field("collection", collection)
            .with_field("id", id)),
    }
}

async fn enqueue_event(
    State(state): State<AppState>,
    body: Result<Json<EventDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<EventAccepted>)> {
    let Json(draft) = body.map_err(|e| {
        ApiError::bad_request("Invalid event body").with_field("detail", e.body_text())
    })?;
    draft
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let id = state
        .publisher
        .enqueue(&draft.source, &draft.event_type, draft.data);
    info!(event_id = %id, source = %draft.source, event_type = %draft.event_type, "Event accepted");

    Ok((
        StatusCode::ACCEPTED,
        Json(EventAccepted { id: id.into() }),
    ))
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_default();
    error!(panic = %detail, "Handler panicked");
    ApiError::internal().into_response()
}
