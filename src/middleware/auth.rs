use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::Claims;
use crate::database::models::Role;
use crate::error::Failure;
use crate::state::AppState;

/// Authenticated caller extracted from the bearer token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            role: claims.role,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .copied()
            .ok_or_else(Failure::unauthenticated)
    }
}

/// Verifies the bearer token and attaches the Principal
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Failure> {
    let token = extract_bearer_token(request.headers()).ok_or_else(Failure::unauthenticated)?;
    let claims = state.tokens.verify(token)?;

    let principal = Principal::from(claims);
    tracing::debug!(user_id = %principal.id, role = %principal.role, "Authenticated request");
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Roles allowed through a route's authorization stage
#[derive(Clone, Copy, Debug)]
pub struct AllowedRoles(pub &'static [Role]);

impl AllowedRoles {
    pub fn permits(&self, role: Role) -> bool {
        self.0.contains(&role)
    }
}

/// Rejects principals whose role is not in the route's allow-list.
/// Must run after `authenticate`.
pub async fn authorize(
    State(allowed): State<AllowedRoles>,
    request: Request,
    next: Next,
) -> Result<Response, Failure> {
    let principal = request
        .extensions()
        .get::<Principal>()
        .copied()
        .ok_or_else(Failure::unauthenticated)?;

    if !allowed.permits(principal.role) {
        tracing::warn!(user_id = %principal.id, role = %principal.role, "Role not permitted");
        return Err(Failure::forbidden());
    }

    Ok(next.run(request).await)
}

/// Token from `Authorization: Bearer <token>`; anything else counts as
/// no credential
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
