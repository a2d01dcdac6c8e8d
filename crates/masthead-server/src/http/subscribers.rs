//! Subscriber endpoints — GET/POST /api/subscribers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use masthead_core::validate;
use masthead_store::{NewSubscriber, Subscriber};

use crate::app::AppState;
use crate::http::{bad_request, store_error, ApiError};

#[derive(Debug, Deserialize)]
pub struct SubscriberPayload {
    pub email: String,
    pub name: Option<String>,
}

/// GET /api/subscribers — active subscribers, newest first.
pub async fn list_subscribers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Subscriber>>, ApiError> {
    let subscribers = state
        .store
        .active_subscribers()
        .map_err(|e| store_error("fetch subscribers", e))?;
    Ok(Json(subscribers))
}

/// POST /api/subscribers
///
/// New address → 201. Known but unsubscribed address → reactivated, 200
/// (a supplied name replaces the stored one). Already subscribed → 400.
pub async fn create_subscriber(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SubscriberPayload>,
) -> Result<(StatusCode, Json<Subscriber>), ApiError> {
    validate::validate_email(&payload.email).map_err(bad_request)?;
    let email = payload.email.trim().to_lowercase();
    let name = payload.name.filter(|n| !n.trim().is_empty());

    let existing = state
        .store
        .find_subscriber(&email)
        .map_err(|e| store_error("fetch subscribers", e))?;

    match existing {
        Some(sub) if sub.subscribed => Err(bad_request("Email is already subscribed")),
        Some(_) => {
            let sub = state
                .store
                .resubscribe(&email, name.as_deref())
                .map_err(|e| store_error("subscribe", e))?;
            Ok((StatusCode::OK, Json(sub)))
        }
        None => {
            let sub = state
                .store
                .create_subscriber(&NewSubscriber { email, name })
                .map_err(|e| store_error("subscribe", e))?;
            Ok((StatusCode::CREATED, Json(sub)))
        }
    }
}
