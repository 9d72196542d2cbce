//! # notely-api
//!
//! The Note Store: notes, their AI conversation history, revision
//! generation, and JSON/CSV transfer over HTTP, backed by SQLite.

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    map_response_body::MapResponseBodyLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::warn;
use uuid::Uuid;

use notely_core::GenerationBackend;
use notely_db::Database;

pub use config::ServerConfig;
pub use error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Backend used by `generate_revision`.
    pub generator: Arc<dyn GenerationBackend>,
}

impl AppState {
    pub fn new(db: Database, generator: Arc<dyn GenerationBackend>) -> Self {
        Self { db, generator }
    }
}

/// Time-ordered UUIDv7 request ids.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Routes only, without middleware.
pub fn router(state: AppState) -> Router {
    use handlers::{history, notes, transfer};

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/get_notes", get(notes::get_notes))
        .route("/add_note", post(notes::add_note))
        .route("/update_note/:id", put(notes::update_note))
        .route("/delete_note/:id", delete(notes::delete_note))
        .route("/search_notes", get(notes::search_notes))
        .route("/update_ai_history/:id", put(history::update_ai_history))
        .route("/generate_revision/:id", post(history::generate_revision))
        .route("/get_full_history/:id", get(history::get_full_history))
        .route("/export_csv", get(transfer::export_csv))
        .route("/export_json", get(transfer::export_json))
        .route("/import_json", post(transfer::import_json))
        .with_state(state)
}

/// The full service: routes plus tracing, request ids, CORS and a body limit.
pub fn app(state: AppState, config: &ServerConfig) -> Router {
    router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(cors_layer(&config.cors_origins))
            .layer(MapResponseBodyLayer::new(axum::body::Body::new))
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes)),
    )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(
                    subsystem = "api",
                    component = "cors",
                    origin = %origin,
                    "Ignoring invalid CORS origin"
                );
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}
