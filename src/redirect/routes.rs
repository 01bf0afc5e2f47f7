use axum::{routing::get, Router};
use std::sync::Arc;

use crate::api::AppState;
use crate::storage::Storage;

use super::handlers::redirect_url;

pub fn create_redirect_router(storage: Arc<dyn Storage>) -> Router {
    let state = Arc::new(AppState { storage });

    Router::new()
        .route("/{code}", get(redirect_url))
        .with_state(state)
}
