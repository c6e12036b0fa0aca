use std::sync::LazyLock;

use bcrypt::{hash, BcryptError};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::errors::{AppError, AppResult};

static EMAIL_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

/// Stored user record. `password` always holds the bcrypt hash.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated, normalised signup ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// What the API returns for a user; the hash never leaves the service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "type")]
    pub role: String,
}

impl SignupRequest {
    /// Runs every rule and joins the failures with a newline, in field order:
    /// name, email, password, type.
    pub fn validate(&self) -> AppResult<Role> {
        let mut errors: Vec<&str> = Vec::new();

        if self.name.is_empty() {
            errors.push("the field name is required can't be empty");
        }

        if self.email.is_empty() {
            errors.push("the field email is required can't be empty");
        } else if !EMAIL_FORMAT.is_match(&self.email) {
            errors.push("the email is invalid");
        }

        if self.password.is_empty() {
            errors.push("the field password is required can't be empty");
        }

        let role = if self.role.is_empty() {
            errors.push("the field type is required can't be empty");
            None
        } else {
            let parsed = self.role.parse::<Role>().ok();
            if parsed.is_none() {
                errors.push("the field type should be Technician or Manager");
            }
            parsed
        };

        match role {
            Some(role) if errors.is_empty() => Ok(role),
            _ => Err(AppError::BadRequest(errors.join("\n"))),
        }
    }

    /// Validate, trim name and email, and replace the password with its hash.
    pub fn prepare(self, bcrypt_cost: u32) -> AppResult<NewUser> {
        let role = self.validate()?;

        let password_hash = hash(self.password.as_bytes(), bcrypt_cost)
            .map_err(|e: BcryptError| AppError::Server(e.to_string()))?;

        Ok(NewUser {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password_hash,
            role,
        })
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AuthenticationData {
    pub id: String,
    pub token: String,
}
