// Failure values forwarded between pipeline stages
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::middleware::classify::FailureClassifier;

/// One violated rule reported by schema validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Dotted path of the offending field (`cast.1`)
    pub field: String,
    pub message: String,
    /// Machine-readable code (`too_small`, `invalid_type`, ...)
    pub code: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

/// Upload limit violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("file size limit exceeded")]
    FileTooLarge,
    #[error("file count limit exceeded")]
    TooManyFiles,
    #[error("unexpected file field '{0}'")]
    UnexpectedField(String),
    #[error("{0}")]
    Other(String),
}

/// Tag of a [`Failure`], used for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    SchemaValidation,
    PersistenceValidation,
    DuplicateKey,
    InvalidReference,
    InvalidCredential,
    ExpiredCredential,
    UploadError,
    Operational,
    MalformedBody,
    RateLimited,
    Unclassified,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::SchemaValidation => "SchemaValidation",
            FailureKind::PersistenceValidation => "PersistenceValidation",
            FailureKind::DuplicateKey => "DuplicateKey",
            FailureKind::InvalidReference => "InvalidReference",
            FailureKind::InvalidCredential => "InvalidCredential",
            FailureKind::ExpiredCredential => "ExpiredCredential",
            FailureKind::UploadError => "UploadError",
            FailureKind::Operational => "Operational",
            FailureKind::MalformedBody => "MalformedBody",
            FailureKind::RateLimited => "RateLimited",
            FailureKind::Unclassified => "Unclassified",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure produced by any request stage and rendered by the classifier
#[derive(Debug, Clone, Error)]
pub enum Failure {
    #[error("Validation failed")]
    SchemaValidation(Vec<FieldIssue>),

    #[error("Database validation failed")]
    PersistenceValidation(BTreeMap<String, String>),

    #[error("{field} already exists")]
    DuplicateKey { field: String },

    #[error("Invalid {field}: {value}")]
    InvalidReference { field: String, value: String },

    /// Carries the verifier's reason for the logs; clients only see "Invalid token"
    #[error("Invalid token: {0}")]
    InvalidCredential(String),

    #[error("Token expired")]
    ExpiredCredential,

    #[error(transparent)]
    Upload(UploadError),

    /// Domain-raised failure with an explicit status
    #[error("{message}")]
    Operational { status: StatusCode, message: String },

    #[error("Invalid JSON: {0}")]
    MalformedBody(String),

    #[error("Too many requests")]
    RateLimited { retry_after: u64 },

    #[error("{message}")]
    Unclassified {
        status: Option<StatusCode>,
        message: String,
        stack: Option<String>,
    },
}

impl Failure {
    pub fn kind(&self) -> FailureKind {
        match self {
            Failure::SchemaValidation(_) => FailureKind::SchemaValidation,
            Failure::PersistenceValidation(_) => FailureKind::PersistenceValidation,
            Failure::DuplicateKey { .. } => FailureKind::DuplicateKey,
            Failure::InvalidReference { .. } => FailureKind::InvalidReference,
            Failure::InvalidCredential(_) => FailureKind::InvalidCredential,
            Failure::ExpiredCredential => FailureKind::ExpiredCredential,
            Failure::Upload(_) => FailureKind::UploadError,
            Failure::Operational { .. } => FailureKind::Operational,
            Failure::MalformedBody(_) => FailureKind::MalformedBody,
            Failure::RateLimited { .. } => FailureKind::RateLimited,
            Failure::Unclassified { .. } => FailureKind::Unclassified,
        }
    }
}

// Constructors for the failures raised by handlers and stages
impl Failure {
    pub fn operational(status: StatusCode, message: impl Into<String>) -> Self {
        Failure::Operational {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::UNAUTHORIZED, message)
    }

    /// No credential was presented at all
    pub fn unauthenticated() -> Self {
        Self::unauthorized("Unauthorized: No token provided")
    }

    pub fn forbidden() -> Self {
        Self::operational(
            StatusCode::FORBIDDEN,
            "Forbidden: You do not have access to this resource.",
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::CONFLICT, message)
    }

    pub fn payload_too_large(limit: usize) -> Self {
        Self::operational(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("Request body exceeds the {} byte limit", limit),
        )
    }

    pub fn invalid_reference(field: impl Into<String>, value: impl Into<String>) -> Self {
        Failure::InvalidReference {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Wrap an unexpected fault, keeping its debug rendering as the trace
    pub fn unclassified(err: impl Into<anyhow::Error>) -> Self {
        let err = err.into();
        Failure::Unclassified {
            status: None,
            message: err.to_string(),
            stack: Some(format!("{:?}", err)),
        }
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Failure::unclassified(err)
    }
}

impl From<UploadError> for Failure {
    fn from(err: UploadError) -> Self {
        Failure::Upload(err)
    }
}

impl From<crate::database::StoreError> for Failure {
    fn from(err: crate::database::StoreError) -> Self {
        use crate::database::StoreError;

        match err {
            StoreError::Validation(errors) => Failure::PersistenceValidation(errors),
            StoreError::DuplicateKey { field } => Failure::DuplicateKey { field },
            other => Failure::unclassified(other),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for Failure {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Failure::ExpiredCredential,
            _ => Failure::InvalidCredential(err.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for Failure {
    fn from(err: tokio::task::JoinError) -> Self {
        Failure::unclassified(err)
    }
}

// Failures travel to the classifier inside the response extensions. The
// body rendered here uses the production policy so a response never leaks
// internals even if no classifier layer is mounted.
impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let mut response = FailureClassifier::default().render(&self);
        response.extensions_mut().insert(self);
        response
    }
}
