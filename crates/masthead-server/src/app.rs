use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use masthead_core::MastheadConfig;
use masthead_publisher::Publisher;
use masthead_store::Store;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
///
/// The handlers and the publisher each hold their own [`Store`] (their own
/// SQLite connection); WAL mode keeps concurrent readers/writers happy.
pub struct AppState {
    pub config: MastheadConfig,
    pub store: Store,
    pub publisher: Publisher,
}

impl AppState {
    pub fn new(config: MastheadConfig, store: Store, publisher: Publisher) -> Self {
        Self {
            config,
            store,
            publisher,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route(
            "/api/posts",
            get(crate::http::posts::list_posts).post(crate::http::posts::create_post),
        )
        .route(
            "/api/posts/{id}",
            get(crate::http::posts::get_post)
                .put(crate::http::posts::update_post)
                .delete(crate::http::posts::delete_post),
        )
        .route(
            "/api/subscribers",
            get(crate::http::subscribers::list_subscribers)
                .post(crate::http::subscribers::create_subscriber),
        )
        .route("/api/scheduler", post(crate::http::scheduler::run_scheduler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
