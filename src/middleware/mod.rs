pub mod auth;
pub mod response;

pub use auth::{extract_bearer, require_identity};
pub use response::{ApiResponse, ApiResult};
