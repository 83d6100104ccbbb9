//! Post endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use quill_common::{AppError, AppResult, is_valid_id};
use quill_core::{CreatePostInput, UpdatePostInput};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response, response::ApiResponse};

/// Post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<quill_db::entities::post::Model> for PostResponse {
    fn from(p: quill_db::entities::post::Model) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            title: p.title,
            content: p.content,
            published: p.published,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// Reaction response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionResponse {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub emoji: String,
    pub created_at: String,
}

impl From<quill_db::entities::reaction::Model> for ReactionResponse {
    fn from(r: quill_db::entities::reaction::Model) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            user_name: r.user_name,
            emoji: r.emoji.to_string(),
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Post with its reactions.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub reactions: Vec<ReactionResponse>,
}

/// Reject malformed path identifiers before touching the store.
fn check_id(id: &str) -> AppResult<()> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(AppError::Validation("Invalid post ID format".to_string()))
    }
}

/// List all posts, newest first.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let posts = state.post_service.list().await?;

    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

/// Create a new post.
async fn create(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> AppResult<Response> {
    let post = state.post_service.create(&identity.user.id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(PostResponse::from(post))),
    )
        .into_response())
}

/// Get a post with its reactions.
async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PostDetailResponse>> {
    check_id(&id)?;

    let post = state.post_service.get(&id).await?;
    let reactions = state.reaction_service.reactions_for_post(&id).await?;

    Ok(ApiResponse::ok(PostDetailResponse {
        post: post.into(),
        reactions: reactions.into_iter().map(Into::into).collect(),
    }))
}

/// Update a post. Author only.
async fn update(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    check_id(&id)?;

    let post = state
        .post_service
        .update(&identity.user.id, &id, input)
        .await?;

    Ok(ApiResponse::ok(post.into()))
}

/// Delete a post. Author only.
async fn delete(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    check_id(&id)?;

    state.post_service.delete(&identity.user.id, &id).await?;

    Ok(response::ok())
}

/// Reaction request.
#[derive(Debug, Deserialize)]
pub struct ReactRequest {
    pub emoji: String,
}

/// React to a post.
async fn react(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReactRequest>,
) -> AppResult<impl IntoResponse> {
    check_id(&id)?;

    state
        .reaction_service
        .submit(&id, &req.emoji, &identity.user)
        .await?;

    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_post).put(update).delete(delete))
        .route("/react/{id}", post(react))
}
