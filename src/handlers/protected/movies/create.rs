// handlers/protected/movies/create.rs - POST /movies handler

use axum::extract::State;

use crate::database::models::{Movie, MovieInput};
use crate::middleware::{ApiResponse, ApiResult, Principal, Validated};
use crate::state::AppState;

/**
 * POST /movies - Create a movie record (admin and manager only)
 *
 * Expected Input:
 * ```json
 * {
 *   "name": "Inception",
 *   "description": "Dreams within dreams",
 *   "cast": ["Leonardo DiCaprio", "Elliot Page"],
 *   "language": "English",
 *   "director": "Christopher Nolan",
 *   "releaseDate": "2010-07-16",
 *   "releaseStatus": "RELEASED",
 *   "trailerUrl": "https://example.com/inception"
 * }
 * ```
 *
 * Responds 201 with the stored record including `id`, `createdAt` and
 * `updatedAt`.
 */
pub async fn movie_create(
    State(state): State<AppState>,
    principal: Principal,
    Validated(input): Validated<MovieInput>,
) -> ApiResult<Movie> {
    tracing::debug!(user_id = %principal.id, "Creating movie '{}'", input.name);

    let movie = state.movies.create_movie(input).await?;
    Ok(ApiResponse::created(movie).with_message("Successfully created movie"))
}
