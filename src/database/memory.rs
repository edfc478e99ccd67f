use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{Movie, MovieInput, NewUser, User};
use crate::database::store::{Store, StoreError};

#[derive(Default)]
struct Collections {
    movies: HashMap<Uuid, Movie>,
    users: HashMap<Uuid, User>,
}

/// Process-local store used by `--in-memory` and the test suite
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_movie(&self, input: MovieInput) -> Result<Movie, StoreError> {
        let errors = input.required_field_errors();
        if !errors.is_empty() {
            return Err(StoreError::Validation(errors));
        }

        let movie = Movie::new(input);
        self.collections
            .write()
            .await
            .movies
            .insert(movie.id, movie.clone());

        tracing::debug!("Inserted movie {} into memory store", movie.id);
        Ok(movie)
    }

    async fn find_movie(&self, id: Uuid) -> Result<Option<Movie>, StoreError> {
        Ok(self.collections.read().await.movies.get(&id).cloned())
    }

    async fn delete_movie(&self, id: Uuid) -> Result<Option<Movie>, StoreError> {
        Ok(self.collections.write().await.movies.remove(&id))
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let errors = user.required_field_errors();
        if !errors.is_empty() {
            return Err(StoreError::Validation(errors));
        }

        // Uniqueness check and insert under one write lock
        let mut collections = self.collections.write().await;
        if collections.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateKey {
                field: "email".to_string(),
            });
        }

        let user = User::new(user);
        collections.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .collections
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}
