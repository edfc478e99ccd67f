use std::sync::Arc;

use uuid::Uuid;

use crate::database::models::{Movie, MovieInput};
use crate::database::Store;
use crate::error::Failure;

const MOVIE_NOT_FOUND: &str = "Movie not found";

/// Movie record operations on top of the store
pub struct MovieService {
    store: Arc<dyn Store>,
}

impl MovieService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create_movie(&self, input: MovieInput) -> Result<Movie, Failure> {
        let movie = self.store.insert_movie(input).await?;
        tracing::info!(movie_id = %movie.id, name = %movie.details.name, "Created movie");
        Ok(movie)
    }

    pub async fn get_movie_by_id(&self, id: &str) -> Result<Movie, Failure> {
        let id = parse_id(id)?;
        self.store
            .find_movie(id)
            .await?
            .ok_or_else(|| Failure::not_found(MOVIE_NOT_FOUND))
    }

    /// Returns the deleted snapshot; deleting again is a 404
    pub async fn delete_movie_by_id(&self, id: &str) -> Result<Movie, Failure> {
        let id = parse_id(id)?;
        let movie = self
            .store
            .delete_movie(id)
            .await?
            .ok_or_else(|| Failure::not_found(MOVIE_NOT_FOUND))?;

        tracing::info!(movie_id = %movie.id, "Deleted movie");
        Ok(movie)
    }
}

fn parse_id(raw: &str) -> Result<Uuid, Failure> {
    Uuid::parse_str(raw).map_err(|_| Failure::invalid_reference("id", raw))
}
