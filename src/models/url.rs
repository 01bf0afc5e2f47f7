use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored code -> URL mapping. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UrlMapping {
    pub short_code: String,
    pub original_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub hash: String,
}
