// handlers/protected/movies/show.rs - GET /movies/:id handler

use axum::extract::State;

use crate::database::models::Movie;
use crate::middleware::{ApiResponse, ApiResult, RecordId};
use crate::state::AppState;

/// GET /movies/:id - 400 for a malformed id, 404 when absent
pub async fn movie_show(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult<Movie> {
    let movie = state.movies.get_movie_by_id(&id).await?;
    Ok(ApiResponse::success(movie).with_message("Successfully fetched movie"))
}
