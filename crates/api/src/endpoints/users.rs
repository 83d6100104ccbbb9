//! User endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use quill_common::AppResult;
use quill_core::{CreateUserInput, RegistrationOutcome};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// User response (never carries the password hash).
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub created_at: String,
}

impl From<quill_db::entities::user::Model> for UserResponse {
    fn from(u: quill_db::entities::user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            full_name: u.full_name,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Create a new user account.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<Response> {
    let user = state.user_service.create(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UserResponse::from(user))),
    )
        .into_response())
}

/// Get the authenticated user.
async fn me(AuthUser(identity): AuthUser) -> ApiResponse<UserResponse> {
    ApiResponse::ok(UserResponse::from(identity.user))
}

/// Device registration request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTokenRequest {
    pub device_token: String,
}

/// Message-only response body.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Register a device token for push reachability.
///
/// The reachability window is the presenting token's remaining lifetime. A
/// fresh registration triggers the notification backlog flush; re-registering
/// an already-active token does not.
async fn register_device(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeviceTokenRequest>,
) -> AppResult<Response> {
    let outcome = state
        .device_service
        .register(
            &identity.user.id,
            &req.device_token,
            identity.claims.expires_at(),
        )
        .await?;

    let (status, message) = match outcome {
        RegistrationOutcome::AlreadyActive => {
            (StatusCode::OK, "Device token is already registered.")
        }
        RegistrationOutcome::Registered => {
            (StatusCode::CREATED, "Device token registered successfully.")
        }
    };

    Ok((
        status,
        Json(MessageResponse {
            message: message.to_string(),
        }),
    )
        .into_response())
}

/// Deregister a device token.
async fn deregister_device(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeviceTokenRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .device_service
        .deregister(&identity.user.id, &req.device_token)
        .await?;

    Ok(Json(MessageResponse {
        message: "Device token deregistered successfully.".to_string(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register))
        .route("/me", get(me))
        .route("/notifications/register", post(register_device))
        .route("/notification/deregister", put(deregister_device))
}
