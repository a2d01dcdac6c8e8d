//! HTTP handlers. All endpoints speak JSON; errors are `{"error": "..."}`
//! with an appropriate status code.

pub mod health;
pub mod posts;
pub mod scheduler;
pub mod subscribers;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::error;

use masthead_store::StoreError;

/// Error shape shared by every handler: status + `{"error": "..."}` body.
pub type ApiError = (StatusCode, Json<Value>);

pub(crate) fn bad_request(msg: impl std::fmt::Display) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({"error": msg.to_string()})))
}

pub(crate) fn not_found(msg: impl std::fmt::Display) -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({"error": msg.to_string()})))
}

pub(crate) fn internal(msg: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": msg.to_string()})),
    )
}

/// Map a store failure onto a response: conflicts are the client's fault,
/// missing rows are 404, anything else is a logged 500.
pub(crate) fn store_error(context: &str, e: StoreError) -> ApiError {
    match e {
        StoreError::SlugTaken { .. } => bad_request("A post with this title already exists"),
        StoreError::EmailTaken { .. } => bad_request("Email is already subscribed"),
        StoreError::PostNotFound { .. } => not_found("Post not found"),
        StoreError::SubscriberNotFound { .. } => not_found("Subscriber not found"),
        e => {
            error!(error = %e, "{context}");
            internal(format!("Failed to {context}"))
        }
    }
}
