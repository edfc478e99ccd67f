use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::TokenService;
use crate::database::models::{NewUser, Role, User};
use crate::database::Store;
use crate::error::Failure;
use crate::validation::schemas::{LoginInput, RegisterInput};

const USER_EXISTS: &str = "User already exist";
const BAD_CREDENTIALS: &str = "Invalid email or password";

/// Public projection of a freshly registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredUser {
    pub name: Option<String>,
    pub email: String,
}

impl From<User> for RegisteredUser {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginSession {
    pub token: String,
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

/// Account registration and credential checks
pub struct AuthService {
    store: Arc<dyn Store>,
    tokens: Arc<TokenService>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, tokens: Arc<TokenService>, bcrypt_cost: u32) -> Self {
        Self {
            store,
            tokens,
            bcrypt_cost,
        }
    }

    /// A concurrent registration that slips past the existence check
    /// surfaces as a duplicate-key failure from the store
    pub async fn register(&self, input: RegisterInput) -> Result<RegisteredUser, Failure> {
        if self.store.find_user_by_email(&input.email).await?.is_some() {
            return Err(Failure::conflict(USER_EXISTS));
        }

        let password_hash = hash_password(input.password, self.bcrypt_cost).await?;
        let user = self
            .store
            .insert_user(NewUser {
                name: input.name,
                email: input.email,
                password_hash,
                role: Role::default(),
            })
            .await?;

        tracing::info!(user_id = %user.id, "Registered user");
        Ok(user.into())
    }

    /// Unknown emails and wrong passwords are indistinguishable to the caller
    pub async fn login(&self, input: LoginInput) -> Result<LoginSession, Failure> {
        let Some(user) = self.store.find_user_by_email(&input.email).await? else {
            return Err(Failure::unauthorized(BAD_CREDENTIALS));
        };

        if !verify_password(input.password, user.password_hash.clone()).await? {
            tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(Failure::unauthorized(BAD_CREDENTIALS));
        }

        let token = self.tokens.issue(user.id, user.role)?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginSession {
            token,
            id: user.id,
            name: user.name,
            email: user.email,
        })
    }
}
