// handlers/public/auth/login.rs - POST /auth/login handler

use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult, Validated};
use crate::services::LoginSession;
use crate::state::AppState;
use crate::validation::schemas::LoginInput;

/**
 * POST /auth/login - Exchange email and password for a bearer token
 *
 * Expected Input:
 * ```json
 * { "email": "ada@example.com", "password": "secret1" }
 * ```
 *
 * Returns `{ token, id, name, email }`. An unknown email and a wrong
 * password both answer 401 "Invalid email or password".
 */
pub async fn login_post(
    State(state): State<AppState>,
    Validated(input): Validated<LoginInput>,
) -> ApiResult<LoginSession> {
    let session = state.auth.login(input).await?;
    Ok(ApiResponse::success(session))
}
