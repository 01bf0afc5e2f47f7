use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

use crate::api::{ApiError, AppState};
use crate::storage::Storage;

/// Redirect to original URL
///
/// The visit is registered in the background after the redirect has been
/// produced; its outcome never affects the response.
pub async fn redirect_url(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Response, ApiError> {
    let url = state
        .storage
        .get(&code)
        .await?
        .ok_or_else(|| ApiError::NotFound("URL not found".to_string()))?;

    let location = HeaderValue::try_from(url).context("stored URL is not a valid header value")?;

    register_visit(Arc::clone(&state.storage), code);

    Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response())
}

fn register_visit(storage: Arc<dyn Storage>, code: String) {
    tokio::spawn(async move {
        if let Err(err) = storage.visit(&code).await {
            warn!(short_code = %code, error = %format!("{err:#}"), "cannot register visit");
        }
    });
}
