//! # regdesk_api
//!
//! HTTP API library for Regdesk: account auth, the public client
//! registration form, and the operator client list.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use regdesk_core::auth::jwt::TokenSigner;
use regdesk_core::auth::store::AccountStore;
use regdesk_core::clients::store::ClientStore;
use regdesk_core::uploads::{FileIntake, MAX_UPLOAD_BYTES};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ApiConfig;
use crate::error::AppError;
use crate::handlers::{auth, clients, health};

/// Request body ceiling for the registration form: the file plus its text fields.
pub const MAX_FORM_BYTES: usize = MAX_UPLOAD_BYTES + 2 * 1024 * 1024;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub clients: Arc<dyn ClientStore>,
    /// Object storage for registration files.
    pub uploads: FileIntake,
    pub tokens: TokenSigner,
    pub config: ApiConfig,
}

/// Run embedded database migrations.
///
/// Delegates to `regdesk_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    regdesk_core::migrate::migrate(pool).await
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(frontend_url.trim_end_matches('/')) {
        Ok(origin) => cors.allow_origin(AllowOrigin::exact(origin)),
        Err(_) => {
            warn!(frontend_url, "FRONTEND_URL is not a valid origin; cross-origin requests disabled");
            cors
        }
    }
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".into())
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let require_auth =
        axum::middleware::from_fn_with_state(state.clone(), middleware::auth::require_auth);

    Router::new()
        .route(routes::GET_HEALTH, get(health::health_handler))
        .route(routes::POST_AUTH_REGISTER, post(auth::register_handler))
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler))
        .route(routes::GET_AUTH_VERIFY, get(auth::verify_handler))
        .route(
            routes::CLIENTS,
            post(clients::create_client_handler)
                .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
                .merge(get(clients::list_clients_handler).route_layer(require_auth.clone())),
        )
        .route(
            routes::CLIENTS_ID,
            get(clients::get_client_handler)
                .put(clients::update_client_handler)
                .delete(clients::delete_client_handler)
                .route_layer(require_auth),
        )
        .fallback(route_not_found)
        .method_not_allowed_fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.frontend_url))
        .with_state(state)
}

