// handlers/protected/movies/delete.rs - DELETE /movies/:id handler

use axum::extract::State;

use crate::database::models::Movie;
use crate::middleware::{ApiResponse, ApiResult, Principal, RecordId};
use crate::state::AppState;

/**
 * DELETE /movies/:id - Remove a movie record (admin and manager only)
 *
 * Responds with the deleted snapshot. Deleting the same id again answers
 * 404 "Movie not found".
 */
pub async fn movie_delete(
    State(state): State<AppState>,
    principal: Principal,
    RecordId(id): RecordId,
) -> ApiResult<Movie> {
    let movie = state.movies.delete_movie_by_id(&id).await?;
    tracing::info!(user_id = %principal.id, movie_id = %movie.id, "Movie deleted by user");

    Ok(ApiResponse::success(movie).with_message("Successfully deleted movie"))
}
