//! HTTP API endpoints.
//!
//! `/auth/register` and `/auth/login` are thin delegations to the
//! identity service for clients that want credentials settled before
//! opening the WebSocket. Neither touches the roster; seats are taken
//! over the socket.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::session::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub result: bool,
    pub msg: String,
}

/// Create an account at the identity service.
///
/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsRequest>,
) -> Response {
    match state.identity.register(&body.username, &body.password).await {
        Ok(resp) => (
            StatusCode::OK,
            Json(AuthResponse {
                result: true,
                msg: resp.msg,
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(AuthResponse {
                result: false,
                msg: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// Verify credentials at the identity service.
///
/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsRequest>,
) -> Response {
    match state.identity.login(&body.username, &body.password).await {
        Ok(resp) => (
            StatusCode::OK,
            Json(AuthResponse {
                result: true,
                msg: resp.msg,
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::UNAUTHORIZED,
            Json(AuthResponse {
                result: false,
                msg: e.to_string(),
            }),
        )
            .into_response(),
    }
}
