use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{SecurityConfig, MAX_JWT_EXPIRY_HOURS};
use crate::database::models::Role;
use crate::error::Failure;

pub mod password;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Lifetimes beyond `MAX_JWT_EXPIRY_HOURS` are clamped
    pub fn new(id: Uuid, role: Role, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let hours = i64::try_from(expiry_hours.min(MAX_JWT_EXPIRY_HOURS)).unwrap_or(24);
        let exp = (now + Duration::hours(hours)).timestamp();

        Self {
            id,
            role,
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Signs and verifies HS256 bearer tokens with the shared secret
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry_hours: u64,
}

impl TokenService {
    pub fn new(security: &SecurityConfig) -> Self {
        let secret = security.jwt_secret.as_bytes();
        let mut validation = Validation::default();
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            expiry_hours: security.jwt_expiry_hours,
        }
    }

    /// Issue a token for an account
    pub fn issue(&self, id: Uuid, role: Role) -> Result<String, Failure> {
        self.sign(&Claims::new(id, role, self.expiry_hours))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, Failure> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| Failure::unclassified(anyhow::anyhow!("JWT generation error: {}", e)))
    }

    /// Expired tokens become `ExpiredCredential`, anything else that fails
    /// to verify becomes `InvalidCredential`
    pub fn verify(&self, token: &str) -> Result<Claims, Failure> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}
