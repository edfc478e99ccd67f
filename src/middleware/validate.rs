// Schema validation stage, expressed as an extractor so each route declares
// the shape it accepts through its handler signature.
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde_json::Value;

use crate::error::Failure;
use crate::middleware::body::ParsedBody;
use crate::validation::Validate;

/// Request payload that passed its declared schema
#[derive(Debug, Clone)]
pub struct Validated<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Validated<T>
where
    T: Validate + Send,
    S: Send + Sync,
{
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Absent or non-JSON bodies validate as an empty object
        let document = parts
            .extensions
            .get::<ParsedBody>()
            .map(|body| body.0.clone())
            .unwrap_or_else(|| Value::Object(Default::default()));

        T::from_document(document)
            .map(Validated)
            .map_err(Failure::SchemaValidation)
    }
}

/// `:id` path segment. A segment that does not decode is reported as an
/// invalid id carrying the raw segment.
#[derive(Debug, Clone)]
pub struct RecordId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<String>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(RecordId(id)),
            Err(rejection) => {
                let raw = parts.uri.path().rsplit('/').next().unwrap_or_default();
                tracing::debug!("Rejected id segment '{}': {}", raw, rejection);
                Err(Failure::invalid_reference("id", raw))
            }
        }
    }
}
