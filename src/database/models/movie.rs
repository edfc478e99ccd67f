use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::database::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReleaseStatus {
    Released,
    Unreleased,
}

impl ReleaseStatus {
    pub const VARIANTS: &'static [&'static str] = &["RELEASED", "UNRELEASED"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseStatus::Released => "RELEASED",
            ReleaseStatus::Unreleased => "UNRELEASED",
        }
    }
}

impl FromStr for ReleaseStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RELEASED" => Ok(ReleaseStatus::Released),
            "UNRELEASED" => Ok(ReleaseStatus::Unreleased),
            other => Err(StoreError::Corrupt(format!("unknown release status '{}'", other))),
        }
    }
}

/// Client-supplied movie fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieInput {
    pub name: String,
    pub description: String,
    pub cast: Vec<String>,
    pub language: String,
    pub director: String,
    pub release_date: String,
    pub release_status: ReleaseStatus,
    pub trailer_url: String,
}

impl MovieInput {
    /// Store-level required-field check, keyed by wire field name
    pub fn required_field_errors(&self) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();
        let text_fields = [
            ("name", &self.name),
            ("description", &self.description),
            ("language", &self.language),
            ("director", &self.director),
            ("releaseDate", &self.release_date),
            ("trailerUrl", &self.trailer_url),
        ];

        for (field, value) in text_fields {
            if value.trim().is_empty() {
                errors.insert(field.to_string(), format!("{} is required", field));
            }
        }
        if self.cast.is_empty() {
            errors.insert("cast".to_string(), "cast is required".to_string());
        }

        errors
    }
}

/// Stored movie: the client fields plus generated id and timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    #[serde(flatten)]
    pub details: MovieInput,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    pub fn new(details: MovieInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            details,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Row shape of the `movies` table
#[derive(Debug, FromRow)]
pub struct MovieRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub cast_members: Vec<String>,
    pub language: String,
    pub director: String,
    pub release_date: String,
    pub release_status: String,
    pub trailer_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<MovieRow> for Movie {
    type Error = StoreError;

    fn try_from(row: MovieRow) -> Result<Self, Self::Error> {
        Ok(Movie {
            id: row.id,
            details: MovieInput {
                name: row.name,
                description: row.description,
                cast: row.cast_members,
                language: row.language,
                director: row.director,
                release_date: row.release_date,
                release_status: row.release_status.parse()?,
                trailer_url: row.trailer_url,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input() -> MovieInput {
        MovieInput {
            name: "Inception".into(),
            description: "Dreams within dreams".into(),
            cast: vec!["Leonardo DiCaprio".into(), "Elliot Page".into()],
            language: "English".into(),
            director: "Christopher Nolan".into(),
            release_date: "2010-07-16".into(),
            release_status: ReleaseStatus::Released,
            trailer_url: "https://example.com/inception".into(),
        }
    }

    #[test]
    fn movie_serializes_flat_camel_case() {
        let movie = Movie::new(input());
        let value = serde_json::to_value(&movie).unwrap();

        assert_eq!(value["id"], json!(movie.id.to_string()));
        assert_eq!(value["releaseStatus"], "RELEASED");
        assert_eq!(value["trailerUrl"], "https://example.com/inception");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("details").is_none());
    }

    #[test]
    fn required_fields_report_blank_values() {
        let mut movie = input();
        movie.director = "  ".into();
        movie.cast.clear();

        let errors = movie.required_field_errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["director"], "director is required");
        assert!(errors.contains_key("cast"));
        assert!(input().required_field_errors().is_empty());
    }

    #[test]
    fn unknown_status_in_row_is_corrupt() {
        assert!(matches!("SOON".parse::<ReleaseStatus>(), Err(StoreError::Corrupt(_))));
        assert_eq!("UNRELEASED".parse::<ReleaseStatus>().unwrap(), ReleaseStatus::Unreleased);
    }
}
