//! Registration and password verification.

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use super::password::{Argon2Hasher, PasswordError};
use crate::database::models::{NewUser, User};
use crate::database::repository::{RepositoryError, UserRepository};

pub const USERNAME_MIN_LENGTH: usize = 1;
pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_LENGTH: usize = 72;

/// Hashed in place of a real one when the username is unknown.
const DECOY_PASSWORD: &str = "noteful-decoy-password";

#[derive(Debug, Error)]
pub enum CredentialError {
    /// Registration input rejected; `location` names the offending field.
    #[error("{message}")]
    Validation { location: &'static str, message: String },

    #[error("That username is taken")]
    DuplicateUsername,

    /// Unknown username or wrong password. The two are never distinguished.
    #[error("Invalid username or password")]
    InvalidCredential,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CredentialError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateUsername => CredentialError::DuplicateUsername,
            other => CredentialError::Repository(other),
        }
    }
}

fn invalid(location: &'static str, message: impl Into<String>) -> CredentialError {
    CredentialError::Validation {
        location,
        message: message.into(),
    }
}

/// A registration request that passed every shape and length rule.
#[derive(Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub fullname: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("fullname", &self.fullname)
            .finish()
    }
}

impl Registration {
    /// Validate a raw JSON body. Rules run in order: required fields, string
    /// types, surrounding whitespace, then lengths.
    pub fn from_json(body: &Value) -> Result<Self, CredentialError> {
        let empty = serde_json::Map::new();
        let fields = body.as_object().unwrap_or(&empty);

        for field in ["username", "password"] {
            if !fields.contains_key(field) {
                return Err(invalid(field, "Missing field"));
            }
        }

        for field in ["username", "password", "fullname"] {
            if let Some(value) = fields.get(field) {
                if !value.is_string() {
                    return Err(invalid(field, "Incorrect field type: expected string"));
                }
            }
        }

        let text = |field: &str| fields.get(field).and_then(Value::as_str).unwrap_or_default().to_string();
        let username = text("username");
        let password = text("password");
        let fullname = text("fullname").trim().to_string();

        // Rejected rather than trimmed: trimming would silently change the secret.
        if username.trim() != username {
            return Err(invalid("username", "Cannot start or end with whitespace"));
        }
        if password.trim() != password {
            return Err(invalid("password", "Cannot start or end with whitespace"));
        }

        if username.chars().count() < USERNAME_MIN_LENGTH {
            return Err(invalid(
                "username",
                format!("Must be at least {} characters long", USERNAME_MIN_LENGTH),
            ));
        }
        let password_length = password.chars().count();
        if password_length < PASSWORD_MIN_LENGTH {
            return Err(invalid(
                "password",
                format!("Must be at least {} characters long", PASSWORD_MIN_LENGTH),
            ));
        }
        if password_length > PASSWORD_MAX_LENGTH {
            return Err(invalid(
                "password",
                format!("Must be at most {} characters long", PASSWORD_MAX_LENGTH),
            ));
        }

        Ok(Self { username, password, fullname })
    }
}

/// Persists users and checks their passwords.
#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserRepository>,
    hasher: Argon2Hasher,
    decoy_hash: Arc<str>,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Argon2Hasher) -> Result<Self, CredentialError> {
        let decoy_hash = hasher.hash(DECOY_PASSWORD)?;
        Ok(Self {
            users,
            hasher,
            decoy_hash: decoy_hash.into(),
        })
    }

    /// Hash the password and store the new user.
    pub async fn register(&self, registration: Registration) -> Result<User, CredentialError> {
        let hasher = self.hasher.clone();
        let password = registration.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::Hash(e.to_string()))??;

        let record = self
            .users
            .insert(NewUser {
                username: registration.username,
                password_hash,
                fullname: registration.fullname,
            })
            .await?;

        tracing::info!("Registered user '{}' ({})", record.username, record.id);
        Ok(record.into())
    }

    /// Return the user when `password` matches, `InvalidCredential` otherwise.
    pub async fn verify(&self, username: &str, password: &str) -> Result<User, CredentialError> {
        let record = self.users.find_by_username(username).await?;

        let stored_hash = match &record {
            Some(user) => user.password_hash.clone(),
            None => self.decoy_hash.to_string(),
        };

        let hasher = self.hasher.clone();
        let candidate = password.to_string();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&candidate, &stored_hash))
            .await
            .map_err(|e| PasswordError::Hash(e.to_string()))??;

        match record {
            Some(user) if matches => Ok(user.into()),
            _ => {
                tracing::debug!("Rejected login for '{}'", username);
                Err(CredentialError::InvalidCredential)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::json;

    fn store() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryStore::new()), Argon2Hasher::new(1024, 1).unwrap()).unwrap()
    }

    fn location(body: Value) -> &'static str {
        match Registration::from_json(&body) {
            Err(CredentialError::Validation { location, .. }) => location,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn missing_fields_are_reported_in_order() {
        assert_eq!(location(json!({})), "username");
        assert_eq!(location(json!({"username": "alice"})), "password");
        assert_eq!(location(json!("not an object")), "username");
    }

    #[test]
    fn non_string_fields_are_rejected() {
        assert_eq!(location(json!({"username": 42, "password": "password123"})), "username");
        assert_eq!(
            location(json!({"username": "alice", "password": "password123", "fullname": ["x"]})),
            "fullname"
        );
    }

    #[test]
    fn surrounding_whitespace_is_rejected() {
        assert_eq!(location(json!({"username": " alice", "password": "password123"})), "username");
        assert_eq!(location(json!({"username": "alice", "password": "password123 "})), "password");
    }

    #[test]
    fn length_rules() {
        assert_eq!(location(json!({"username": "", "password": "password123"})), "username");
        assert_eq!(location(json!({"username": "alice", "password": "short"})), "password");
        let long = "x".repeat(PASSWORD_MAX_LENGTH + 1);
        assert_eq!(location(json!({"username": "alice", "password": long})), "password");

        let exact = "x".repeat(PASSWORD_MAX_LENGTH);
        assert!(Registration::from_json(&json!({"username": "alice", "password": exact})).is_ok());
    }

    #[test]
    fn inner_password_whitespace_is_kept() {
        let reg = Registration::from_json(&json!({
            "username": "alice",
            "password": "pass word 123",
            "fullname": "  Alice Smith "
        }))
        .unwrap();
        assert_eq!(reg.password, "pass word 123");
        assert_eq!(reg.fullname, "Alice Smith");
        assert!(!format!("{:?}", reg).contains("pass word"));
    }

    fn alice() -> Registration {
        Registration {
            username: "alice".into(),
            password: "password123".into(),
            fullname: "Alice".into(),
        }
    }

    #[tokio::test]
    async fn register_then_verify() {
        let store = store();
        let user = store.register(alice()).await.unwrap();
        assert_eq!(user.username, "alice");

        let verified = store.verify("alice", "password123").await.unwrap();
        assert_eq!(verified.id, user.id);
        assert_eq!(verified.username, "alice");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let store = store();
        store.register(alice()).await.unwrap();

        let wrong = store.verify("alice", "password124").await.unwrap_err();
        let unknown = store.verify("bob", "password123").await.unwrap_err();
        assert!(matches!(wrong, CredentialError::InvalidCredential));
        assert!(matches!(unknown, CredentialError::InvalidCredential));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn duplicate_username_is_reported() {
        let store = store();
        store.register(alice()).await.unwrap();
        assert!(matches!(
            store.register(alice()).await,
            Err(CredentialError::DuplicateUsername)
        ));
    }
}
