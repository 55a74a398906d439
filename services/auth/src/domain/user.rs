//! User account

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::password::{PasswordError, PasswordHasher};

/// A person holding an account, either with an email and password or
/// through a linked OAuth identity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub is_active: bool,
    pub created: DateTime<Utc>,
}

impl User {
    /// A new account with a fresh id and no password
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: Option<String>,
        is_active: bool,
    ) -> Self {
        User {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email,
            password: None,
            is_active,
            created: Utc::now(),
        }
    }

    /// Replace the stored password with the hash of `plaintext`
    pub fn set_password(
        &mut self,
        plaintext: &str,
        hasher: &dyn PasswordHasher,
    ) -> Result<(), PasswordError> {
        self.password = Some(hasher.hash(plaintext)?);
        Ok(())
    }

    /// Accounts without a password never match
    pub fn verify_password(&self, plaintext: &str, hasher: &dyn PasswordHasher) -> bool {
        self.password
            .as_deref()
            .is_some_and(|hash| hasher.verify(hash, plaintext))
    }

    pub fn set_active(&mut self) {
        self.is_active = true;
    }
}
