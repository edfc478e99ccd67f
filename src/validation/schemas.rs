// Declared shapes of the request payloads
use serde::Deserialize;

use crate::database::models::{MovieInput, ReleaseStatus};
use crate::validation::{ObjectSchema, Rule, Validate};

impl Validate for MovieInput {
    fn schema() -> ObjectSchema {
        ObjectSchema::new()
            .field("name", Rule::string().min(2, "Name must be at least 2 characters"))
            .field("description", Rule::string().min(1, "Description is required"))
            .field(
                "cast",
                Rule::array(Rule::string()).min(2, "At least two cast members are required"),
            )
            .field("language", Rule::string().min(1, "Language is required"))
            .field("director", Rule::string().min(1, "Director is required"))
            .field("releaseDate", Rule::string().min(1, "Release date is required"))
            .field("releaseStatus", Rule::one_of(ReleaseStatus::VARIANTS))
            .field("trailerUrl", Rule::string().url("Invalid trailer URL"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

impl Validate for RegisterInput {
    fn schema() -> ObjectSchema {
        ObjectSchema::new()
            .field(
                "name",
                Rule::string()
                    .min(2, "Name must be at least 2 characters long")
                    .optional(),
            )
            .field("email", Rule::string().email("Invalid email format"))
            .field(
                "password",
                Rule::string().min(6, "Password must be at least 6 characters long"),
            )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl Validate for LoginInput {
    fn schema() -> ObjectSchema {
        ObjectSchema::new()
            .field("email", Rule::string().email("Invalid email format"))
            .field("password", Rule::string().min(1, "Password is required"))
    }
}
