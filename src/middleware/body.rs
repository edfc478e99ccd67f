// Body parsing stage: JSON requests are buffered up to the configured limit
// and parsed once; later stages read the document from the extensions.
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use crate::error::Failure;
use crate::state::AppState;

/// Parsed JSON document of the current request
#[derive(Debug, Clone)]
pub struct ParsedBody(pub Value);

pub async fn parse_body(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Failure> {
    if !is_json(request.headers()) {
        return Ok(next.run(request).await);
    }

    let limit = state.config.api.max_request_size_bytes;
    let (mut parts, body) = request.into_parts();

    let bytes = axum::body::to_bytes(body, limit).await.map_err(|err| {
        if std::error::Error::source(&err)
            .is_some_and(|source| source.is::<http_body_util::LengthLimitError>())
        {
            Failure::payload_too_large(limit)
        } else {
            Failure::MalformedBody(format!("failed to read request body: {}", err))
        }
    })?;

    // An empty body is treated as no body at all
    if !bytes.is_empty() {
        let document: Value =
            serde_json::from_slice(&bytes).map_err(|e| Failure::MalformedBody(e.to_string()))?;
        parts.extensions.insert(ParsedBody(document));
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(request).await)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}
