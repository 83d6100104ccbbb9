//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use quill_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response.
#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Verify credentials and issue an access token.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let access_token = state.auth_service.login(&req.username, &req.password).await?;

    Ok(ApiResponse::ok(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}
