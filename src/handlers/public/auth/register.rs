// handlers/public/auth/register.rs - POST /auth/register handler

use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult, Validated};
use crate::services::RegisteredUser;
use crate::state::AppState;
use crate::validation::schemas::RegisterInput;

/**
 * POST /auth/register - Create a user account
 *
 * Expected Input:
 * ```json
 * { "name": "Ada", "email": "ada@example.com", "password": "secret1" }
 * ```
 *
 * `name` is optional. New accounts always get the `user` role. Returns the
 * public projection `{ name, email }`; an existing email answers 409.
 */
pub async fn register_post(
    State(state): State<AppState>,
    Validated(input): Validated<RegisterInput>,
) -> ApiResult<RegisteredUser> {
    let user = state.auth.register(input).await?;
    Ok(ApiResponse::success(user))
}
