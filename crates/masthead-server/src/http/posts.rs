//! Post CRUD — GET/POST /api/posts, GET/PUT/DELETE /api/posts/{id}.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use masthead_core::{slugify, validate};
use masthead_store::{NewPost, Post, PostUpdate};

use crate::app::AppState;
use crate::http::{bad_request, store_error, ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// `published=true` restricts the listing to published posts.
    pub published: Option<String>,
    pub limit: Option<u32>,
}

/// Incoming post payload for both create and update.
#[derive(Debug, Deserialize)]
pub struct PostPayload {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    #[serde(default)]
    pub published: bool,
    /// RFC3339; must be in the future when present.
    pub scheduled_at: Option<String>,
}

struct ValidPost {
    title: String,
    content: String,
    excerpt: Option<String>,
    slug: String,
    published: bool,
    scheduled_at: Option<DateTime<Utc>>,
}

/// Shared validation for create and update.
fn validate_payload(payload: PostPayload) -> Result<ValidPost, ApiError> {
    validate::validate_title(&payload.title).map_err(bad_request)?;
    validate::validate_content(&payload.content).map_err(bad_request)?;
    let scheduled_at = validate::validate_scheduled_at(payload.scheduled_at.as_deref(), Utc::now())
        .map_err(bad_request)?;

    let slug = slugify(&payload.title);
    if slug.is_empty() {
        return Err(bad_request(
            "Title must contain at least one letter or digit",
        ));
    }

    Ok(ValidPost {
        title: payload.title.trim().to_string(),
        content: payload.content,
        excerpt: payload.excerpt.filter(|e| !e.trim().is_empty()),
        slug,
        published: payload.published,
        scheduled_at,
    })
}

/// GET /api/posts?published=true&limit=N
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let published_only = params.published.as_deref() == Some("true");
    let posts = state
        .store
        .list_posts(published_only, params.limit)
        .map_err(|e| store_error("fetch posts", e))?;
    Ok(Json(posts))
}

/// POST /api/posts
///
/// A post created with `published = true` triggers an immediate best-effort
/// newsletter notification, with the same swallow semantics as the scheduled
/// publish run.
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PostPayload>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let valid = validate_payload(payload)?;

    let post = state
        .store
        .create_post(&NewPost {
            title: valid.title,
            content: valid.content,
            excerpt: valid.excerpt,
            slug: valid.slug,
            published: valid.published,
            scheduled_at: valid.scheduled_at,
        })
        .map_err(|e| store_error("create post", e))?;

    if post.published {
        if let Err(e) = state.publisher.notify(&post).await {
            warn!(post_id = %post.id, error = %e, "newsletter notification failed");
        }
    }

    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/posts/{id}
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let post = state
        .store
        .get_post(&id)
        .map_err(|e| store_error("fetch post", e))?;
    Ok(Json(post))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<PostPayload>,
) -> Result<Json<Post>, ApiError> {
    let valid = validate_payload(payload)?;

    let post = state
        .store
        .update_post(
            &id,
            &PostUpdate {
                title: valid.title,
                content: valid.content,
                excerpt: valid.excerpt,
                slug: valid.slug,
                published: valid.published,
                scheduled_at: valid.scheduled_at,
            },
        )
        .map_err(|e| store_error("update post", e))?;
    Ok(Json(post))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .store
        .delete_post(&id)
        .map_err(|e| store_error("delete post", e))?;
    Ok(Json(json!({"message": "Post deleted successfully"})))
}
