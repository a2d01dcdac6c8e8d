//! Manual publish trigger — POST /api/scheduler.
//!
//! The same operation the background loop runs on its interval; exposing it
//! over HTTP lets an external cron (or an operator) drive publishing instead.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::error;

use crate::app::AppState;
use crate::http::{internal, ApiError};

/// POST /api/scheduler — run one scheduled-publish pass.
pub async fn run_scheduler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let published_count = state.publisher.process_scheduled().await.map_err(|e| {
        error!(error = %e, "scheduled publish run failed");
        internal("Failed to process scheduled posts")
    })?;

    Ok(Json(json!({
        "message": format!("Processed {published_count} scheduled posts"),
        "published_count": published_count,
    })))
}
