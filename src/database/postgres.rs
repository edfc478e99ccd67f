use async_trait::async_trait;
use sqlx::{postgres::PgDatabaseError, PgPool};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::database::manager::{self, constraint_field};
use crate::database::models::{Movie, MovieInput, MovieRow, NewUser, User, UserRow};
use crate::database::store::{Store, StoreError};

const MOVIE_COLUMNS: &str = "id, name, description, cast_members, language, director, \
     release_date, release_status, trailer_url, created_at, updated_at";

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and make sure both tables exist
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = manager::connect(config).await?;
        manager::ensure_schema(&pool).await?;
        Ok(Self::new(pool))
    }
}

/// Translate constraint violations into the store's own error tags
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            // unique_violation
            Some("23505") => {
                return StoreError::DuplicateKey {
                    field: db.constraint().map(constraint_field).unwrap_or_else(|| "unknown".to_string()),
                };
            }
            // not_null_violation
            Some("23502") => {
                let field = db
                    .try_downcast_ref::<PgDatabaseError>()
                    .and_then(|pg| pg.column())
                    .unwrap_or("unknown")
                    .to_string();
                let mut errors = BTreeMap::new();
                errors.insert(field.clone(), format!("{} is required", field));
                return StoreError::Validation(errors);
            }
            // check_violation
            Some("23514") => {
                let field = db.constraint().map(constraint_field).unwrap_or_else(|| "unknown".to_string());
                let mut errors = BTreeMap::new();
                errors.insert(field.clone(), format!("{} is required", field));
                return StoreError::Validation(errors);
            }
            _ => {}
        }
    }
    StoreError::Sqlx(err)
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_movie(&self, input: MovieInput) -> Result<Movie, StoreError> {
        let errors = input.required_field_errors();
        if !errors.is_empty() {
            return Err(StoreError::Validation(errors));
        }

        let movie = Movie::new(input);
        let sql = format!(
            "INSERT INTO movies ({MOVIE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {MOVIE_COLUMNS}"
        );

        let row = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(movie.id)
            .bind(&movie.details.name)
            .bind(&movie.details.description)
            .bind(&movie.details.cast)
            .bind(&movie.details.language)
            .bind(&movie.details.director)
            .bind(&movie.details.release_date)
            .bind(movie.details.release_status.as_str())
            .bind(&movie.details.trailer_url)
            .bind(movie.created_at)
            .bind(movie.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.try_into()
    }

    async fn find_movie(&self, id: Uuid) -> Result<Option<Movie>, StoreError> {
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1");
        sqlx::query_as::<_, MovieRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .map(Movie::try_from)
            .transpose()
    }

    async fn delete_movie(&self, id: Uuid) -> Result<Option<Movie>, StoreError> {
        let sql = format!("DELETE FROM movies WHERE id = $1 RETURNING {MOVIE_COLUMNS}");
        sqlx::query_as::<_, MovieRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .map(Movie::try_from)
            .transpose()
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let errors = user.required_field_errors();
        if !errors.is_empty() {
            return Err(StoreError::Validation(errors));
        }

        let user = User::new(user);
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {USER_COLUMNS}"
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.try_into()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .map(User::try_from)
            .transpose()
    }
}
