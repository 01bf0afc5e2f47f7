pub mod handlers;
pub mod routes;

pub use handlers::{ApiError, AppState, ErrorResponse, SuccessResponse};
pub use routes::{create_api_router, create_router};
