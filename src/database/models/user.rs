use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::database::StoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    Manager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Manager => "manager",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            other => Err(StoreError::Corrupt(format!("unknown role '{}'", other))),
        }
    }
}

/// Account about to be inserted; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl NewUser {
    pub fn required_field_errors(&self) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();
        if self.email.trim().is_empty() {
            errors.insert("email".to_string(), "email is required".to_string());
        }
        if self.password_hash.is_empty() {
            errors.insert("password".to_string(), "password is required".to_string());
        }
        errors
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(new: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Row shape of the `users` table
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accounts_default_to_user_role() {
        assert_eq!(Role::default(), Role::User);
        assert_eq!(serde_json::to_value(Role::default()).unwrap(), "user");
        assert_eq!("manager".parse::<Role>().unwrap(), Role::Manager);
    }
}
