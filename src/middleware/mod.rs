pub mod auth;
pub mod body;
pub mod classify;
pub mod rate_limit;
pub mod response;
pub mod validate;

pub use auth::{authenticate, authorize, AllowedRoles, Principal};
pub use body::{parse_body, ParsedBody};
pub use classify::{classify_failures, panic_to_failure, FailureClassifier};
pub use rate_limit::{rate_limit, ClientRateLimiter};
pub use response::{ApiResponse, ApiResult};
pub use validate::{RecordId, Validated};
