use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Movie, MovieInput, NewUser, User};

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Required fields missing: {0:?}")]
    Validation(BTreeMap<String, String>),

    #[error("Duplicate value for unique field '{field}'")]
    DuplicateKey { field: String },

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Document store holding movies and user accounts. Each call is atomic
/// for the single document it touches.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap round trip used by the health endpoint
    async fn ping(&self) -> Result<(), StoreError>;

    async fn insert_movie(&self, input: MovieInput) -> Result<Movie, StoreError>;

    async fn find_movie(&self, id: Uuid) -> Result<Option<Movie>, StoreError>;

    /// Remove a movie and return the snapshot that was deleted
    async fn delete_movie(&self, id: Uuid) -> Result<Option<Movie>, StoreError>;

    /// Insert an account; a taken email is a `DuplicateKey` on `email`
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}
