//! API middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use quill_core::{AuthService, DeviceService, PostService, ReactionService, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Login and bearer verification.
    pub auth_service: AuthService,
    /// User registration and lookup.
    pub user_service: UserService,
    /// Post CRUD.
    pub post_service: PostService,
    /// The reaction pipeline.
    pub reaction_service: ReactionService,
    /// Reachability registry and backlog flush.
    pub device_service: DeviceService,
}

/// Authentication middleware.
///
/// A valid bearer token puts the verified [`quill_core::Identity`] into the
/// request extensions; everything else leaves the request anonymous and lets
/// the extractor reject it where auth is required.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(identity) = state.auth_service.identify(token).await
    {
        req.extensions_mut().insert(identity);
    }

    next.run(req).await
}
