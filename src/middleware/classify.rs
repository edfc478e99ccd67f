// Terminal failure classifier: every forwarded Failure becomes exactly one
// JSON response with the uniform `{ success: false, message, ... }` shape.
use std::any::Any;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::config::Environment;
use crate::error::{Failure, UploadError};
use crate::state::AppState;

const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// Maps failures to status codes and bodies according to the deployment mode
#[derive(Debug, Clone, Copy)]
pub struct FailureClassifier {
    environment: Environment,
}

impl Default for FailureClassifier {
    fn default() -> Self {
        Self::new(Environment::Production)
    }
}

impl FailureClassifier {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    /// Status code and JSON body for a failure
    pub fn classify(&self, failure: &Failure) -> (StatusCode, Value) {
        match failure {
            Failure::SchemaValidation(issues) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "message": "Validation failed",
                    "errors": issues,
                }),
            ),
            Failure::PersistenceValidation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "success": false,
                    "message": "Database validation failed",
                    "errors": errors,
                }),
            ),
            Failure::DuplicateKey { field } => (
                StatusCode::CONFLICT,
                json!({
                    "success": false,
                    "message": format!("{} already exists", field),
                    "field": field,
                }),
            ),
            Failure::InvalidReference { field, value } => (
                StatusCode::BAD_REQUEST,
                fail_body(format!("Invalid {}: {}", field, value)),
            ),
            Failure::InvalidCredential(_) => (StatusCode::UNAUTHORIZED, fail_body("Invalid token")),
            Failure::ExpiredCredential => (StatusCode::UNAUTHORIZED, fail_body("Token expired")),
            Failure::Upload(err) => {
                let message = match err {
                    UploadError::FileTooLarge => "File too large".to_string(),
                    UploadError::TooManyFiles => "Too many files uploaded".to_string(),
                    UploadError::UnexpectedField(_) => "Unexpected file field".to_string(),
                    UploadError::Other(msg) => msg.clone(),
                };
                (StatusCode::BAD_REQUEST, fail_body(message))
            }
            Failure::Operational { status, message } => (*status, fail_body(message.as_str())),
            Failure::MalformedBody(_) => (StatusCode::BAD_REQUEST, fail_body("Invalid JSON")),
            Failure::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                fail_body("Too many requests, please try again later"),
            ),
            Failure::Unclassified { status, message, stack } => {
                let status = status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let mut body = match self.environment {
                    Environment::Production => fail_body(INTERNAL_SERVER_ERROR),
                    _ => fail_body(message.as_str()),
                };
                if let (Environment::Development, Some(stack)) = (self.environment, stack) {
                    body["stack"] = Value::String(stack.clone());
                }
                (status, body)
            }
        }
    }

    /// Build the HTTP response without logging
    pub fn render(&self, failure: &Failure) -> Response {
        let (status, body) = self.classify(failure);
        let mut response = (status, Json(body)).into_response();

        if let Failure::RateLimited { retry_after } = failure {
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }

    /// Log the raw failure, then build its response
    pub fn handle(&self, failure: &Failure, method: &str, path: &str) -> Response {
        let response = self.render(failure);
        let status = response.status();

        if status.is_server_error() {
            tracing::error!(
                kind = %failure.kind(),
                status = status.as_u16(),
                method,
                path,
                "Request failed: {:?}",
                failure
            );
        } else {
            tracing::warn!(
                kind = %failure.kind(),
                status = status.as_u16(),
                method,
                path,
                "Request failed: {:?}",
                failure
            );
        }

        response
    }
}

fn fail_body(message: impl Into<String>) -> Value {
    json!({
        "success": false,
        "message": message.into(),
    })
}

/// Outermost application stage. Any response that carries a forwarded
/// Failure is re-rendered under the configured environment.
pub async fn classify_failures(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    match response.extensions().get::<Failure>() {
        Some(failure) => state.classifier.handle(failure, &method, &path),
        None => response,
    }
}

/// Converts a caught panic into an unclassified failure
pub fn panic_to_failure(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };

    Failure::Unclassified {
        status: None,
        message: format!("Handler panicked: {}", message),
        stack: Some(std::backtrace::Backtrace::force_capture().to_string()),
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldIssue;
    use std::collections::BTreeMap;

    fn development() -> FailureClassifier {
        FailureClassifier::new(Environment::Development)
    }

    fn production() -> FailureClassifier {
        FailureClassifier::new(Environment::Production)
    }

    #[test]
    fn schema_validation_lists_every_issue() {
        let failure = Failure::SchemaValidation(vec![
            FieldIssue::new("name", "Name must be at least 2 characters", "too_small"),
            FieldIssue::new("cast.0", "Expected string, received number", "invalid_type"),
        ]);
        let (status, body) = production().classify(&failure);

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
        assert_eq!(body["errors"][1]["field"], "cast.0");
        assert_eq!(body["errors"][1]["code"], "invalid_type");
    }

    #[test]
    fn persistence_validation_is_a_field_map() {
        let mut errors = BTreeMap::new();
        errors.insert("director".to_string(), "director is required".to_string());
        let (status, body) = production().classify(&Failure::PersistenceValidation(errors));

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "Database validation failed");
        assert_eq!(body["errors"]["director"], "director is required");
    }

    #[test]
    fn duplicate_key_names_the_field() {
        let failure = Failure::DuplicateKey { field: "email".into() };
        let (status, body) = production().classify(&failure);

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "email already exists");
        assert_eq!(body["field"], "email");
    }

    #[test]
    fn invalid_reference_echoes_the_value() {
        let (status, body) = production().classify(&Failure::invalid_reference("id", "abc123"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid id: abc123");
    }

    #[test]
    fn credential_failures_hide_the_reason() {
        let (status, body) = development().classify(&Failure::InvalidCredential("InvalidSignature".into()));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid token");

        let (status, body) = development().classify(&Failure::ExpiredCredential);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Token expired");
    }

    #[test]
    fn upload_errors_have_specific_messages() {
        let cases = [
            (UploadError::FileTooLarge, "File too large"),
            (UploadError::TooManyFiles, "Too many files uploaded"),
            (UploadError::UnexpectedField("poster".into()), "Unexpected file field"),
            (UploadError::Other("Field name too long".into()), "Field name too long"),
        ];
        for (err, expected) in cases {
            let (status, body) = production().classify(&Failure::Upload(err));
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], expected);
        }
    }

    #[test]
    fn operational_uses_its_own_status() {
        let failure = Failure::operational(StatusCode::PAYMENT_REQUIRED, "Payment required");
        let (status, body) = production().classify(&failure);
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body, json!({ "success": false, "message": "Payment required" }));
    }

    #[test]
    fn malformed_body_and_rate_limit() {
        let (status, body) = production().classify(&Failure::MalformedBody("trailing comma".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid JSON");

        let response = production().render(&Failure::RateLimited { retry_after: 7 });
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "7");
    }

    #[test]
    fn unclassified_is_masked_in_production() {
        let failure = Failure::unclassified(anyhow::anyhow!("connection reset"));
        let (status, body) = production().classify(&failure);

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("stack").is_none());
    }

    #[test]
    fn unclassified_shows_message_and_stack_in_development() {
        let failure = Failure::unclassified(anyhow::anyhow!("connection reset"));
        let (_, body) = development().classify(&failure);

        assert_eq!(body["message"], "connection reset");
        assert!(body["stack"].as_str().unwrap().contains("connection reset"));
    }

    #[test]
    fn staging_shows_message_without_stack() {
        let failure = Failure::unclassified(anyhow::anyhow!("connection reset"));
        let (_, body) = FailureClassifier::new(Environment::Staging).classify(&failure);

        assert_eq!(body["message"], "connection reset");
        assert!(body.get("stack").is_none());
    }

    #[test]
    fn unclassified_keeps_an_explicit_status() {
        let failure = Failure::Unclassified {
            status: Some(StatusCode::SERVICE_UNAVAILABLE),
            message: "store offline".into(),
            stack: None,
        };
        let (status, _) = production().classify(&failure);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn panics_become_unclassified_failures() {
        let response = panic_to_failure(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let failure = response.extensions().get::<Failure>().unwrap();
        assert_eq!(failure.to_string(), "Handler panicked: boom");
    }
}
