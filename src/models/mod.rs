mod stats;
mod url;

pub use stats::{visit_key, Stats};
pub use url::{ShortenRequest, ShortenResponse, UrlMapping};
