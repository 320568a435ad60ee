//! Authentication request handlers.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::AppState;
use crate::error::{AppJson, AppResult};
use crate::middleware::auth::bearer_token;
use crate::models::{
    ApiResponse, AuthPayload, AuthUser, LoginRequest, RegisterRequest, SessionPayload,
};
use crate::services::auth;

/// `POST /api/auth/register`: create an operator or admin account.
pub async fn register_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthPayload>>)> {
    let payload = auth::register(&state, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(payload).with_message("User registered successfully")),
    ))
}

/// `POST /api/auth/login`: authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthPayload>>> {
    let payload = auth::login(&state, body).await?;
    Ok(Json(
        ApiResponse::data(payload).with_message("Login successful"),
    ))
}

/// `GET /api/auth/verify`: resolve the bearer token to its account.
pub async fn verify_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<ApiResponse<SessionPayload>>> {
    let token = bearer_token(&headers)?;
    let account = auth::verify_session(&state, token).await?;
    Ok(Json(ApiResponse::data(SessionPayload {
        user: AuthUser::from(&account),
    })))
}
