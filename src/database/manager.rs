use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::store::StoreError;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS movies (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL CONSTRAINT movies_name_required CHECK (name <> ''),
        description TEXT NOT NULL CONSTRAINT movies_description_required CHECK (description <> ''),
        cast_members TEXT[] NOT NULL CONSTRAINT movies_cast_required CHECK (cardinality(cast_members) > 0),
        language TEXT NOT NULL CONSTRAINT movies_language_required CHECK (language <> ''),
        director TEXT NOT NULL CONSTRAINT movies_director_required CHECK (director <> ''),
        release_date TEXT NOT NULL CONSTRAINT "movies_releaseDate_required" CHECK (release_date <> ''),
        release_status TEXT NOT NULL CHECK (release_status IN ('RELEASED', 'UNRELEASED')),
        trailer_url TEXT NOT NULL CONSTRAINT "movies_trailerUrl_required" CHECK (trailer_url <> ''),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name TEXT,
        email TEXT NOT NULL CONSTRAINT users_email_key UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin', 'manager')),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
];

/// Open the connection pool once at startup
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    if config.url.is_empty() {
        return Err(StoreError::ConfigMissing("DATABASE_URL"));
    }
    let url = url::Url::parse(&config.url).map_err(|_| StoreError::InvalidDatabaseUrl)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect(url.as_str())
        .await?;

    info!(
        "Connected to database {} on {}",
        url.path().trim_start_matches('/'),
        url.host_str().unwrap_or("localhost")
    );
    Ok(pool)
}

/// Create the collections if they do not exist yet
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema ready");
    Ok(())
}

/// Map a constraint name such as `users_email_key` or
/// `movies_releaseDate_required` to the field it guards
pub fn constraint_field(constraint: &str) -> String {
    let without_table = constraint
        .split_once('_')
        .map(|(_, rest)| rest)
        .unwrap_or(constraint);

    without_table
        .strip_suffix("_key")
        .or_else(|| without_table.strip_suffix("_required"))
        .unwrap_or(without_table)
        .to_string()
}
