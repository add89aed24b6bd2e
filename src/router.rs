use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::ForgeError;
use crate::api::serper::SearchClient;
use crate::api::xai::ChatClient;
use crate::config::CONFIG;
use crate::db::sqlite::ForgeStorage;
use crate::handlers;
use crate::middleware::rate_limit::ApiLimits;

const MAX_BODY_BYTES: usize = 256 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub storage: ForgeStorage,
    pub chat: ChatClient,
    pub search: SearchClient,
    pub limits: Arc<ApiLimits>,
}

impl AppState {
    pub fn new(storage: ForgeStorage) -> Result<Self, ForgeError> {
        Ok(Self {
            storage,
            chat: ChatClient::new(&CONFIG.xai)?,
            search: SearchClient::new(&CONFIG.serper)?,
            limits: Arc::new(ApiLimits::new()),
        })
    }
}

pub fn forge_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/threads/generate", post(handlers::threads::generate))
        .route("/threads/history", get(handlers::threads::history_list))
        .route(
            "/threads/history/{id}",
            get(handlers::threads::history_detail),
        )
        .route("/threads/{id}/feedback", post(handlers::threads::feedback))
        .route("/profiles/analyze", post(handlers::profiles::analyze))
        .route("/tweets/improve", post(handlers::tweets::improve))
        .route(
            "/tweets/improvement-types",
            get(handlers::tweets::improvement_types_handler),
        )
        .route(
            "/brand-guidelines",
            get(handlers::brand::get).put(handlers::brand::upsert),
        );

    Router::new()
        .nest("/api/v1", api)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = CONFIG
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static("x-client-id"),
            header::HeaderName::from_static("x-api-key"),
        ])
        .allow_credentials(true)
}
