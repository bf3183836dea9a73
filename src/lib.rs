//! Backend and profile-photo pipeline for a personal portfolio site.
//!
//! The HTTP side relays contact form submissions by email. The [`photo`]
//! module normalizes an uploaded profile picture and keeps it in a local
//! key/value store; it never touches the server.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod cleanup;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod middleware;
pub mod models;
pub mod photo;
pub mod rate_limit;
pub mod services;
pub mod validation;

use config::Config;
use constants::{MAX_BODY_SIZE, RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_WINDOW_SECS};
use mailer::Mailer;
use rate_limit::{Clock, RateLimiter};
use services::ContactService;

/// Shared request state
pub struct AppState {
    pub config: Arc<Config>,
    pub limiter: Arc<RateLimiter>,
    pub contact: ContactService,
}

impl AppState {
    pub fn new(config: Config, mailer: Arc<dyn Mailer>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config: Arc::new(config),
            limiter: Arc::new(RateLimiter::new(
                RATE_LIMIT_MAX_REQUESTS,
                Duration::from_secs(RATE_LIMIT_WINDOW_SECS),
                clock,
            )),
            contact: ContactService::new(mailer),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let contact = Router::new()
        .route("/api/contact", post(handlers::contact))
        .route_layer(from_fn_with_state(state.clone(), middleware::rate_limit));

    let mut app = Router::new()
        .route("/api/health", get(handlers::health))
        .merge(contact)
        // API docs
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", handlers::ApiDoc::openapi()));

    // Built single-page site
    if let Some(dir) = &state.config.static_dir {
        let index = Path::new(dir).join("index.html");
        app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    app.layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(cors_layer(&state.config))
        .layer(from_fn_with_state(state.clone(), middleware::origin_guard))
        .layer(from_fn(middleware::security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins = if config.cors_origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            config
                .cors_origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
