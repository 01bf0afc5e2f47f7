use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::redirect::create_redirect_router;
use crate::storage::Storage;

use super::handlers::{get_stats, shorten_url, AppState};

pub fn create_api_router(storage: Arc<dyn Storage>) -> Router {
    let state = Arc::new(AppState { storage });

    Router::new()
        .route("/", post(shorten_url))
        .route("/{code}/stats", get(get_stats))
        .with_state(state)
}

/// Full service: shorten, redirect and stats on one listener
pub fn create_router(storage: Arc<dyn Storage>) -> Router {
    create_api_router(Arc::clone(&storage))
        .merge(create_redirect_router(storage))
        .layer(TraceLayer::new_for_http())
}
