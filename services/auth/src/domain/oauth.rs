//! Identity linked from a third-party provider

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Supported OAuth2 identity providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Facebook,
}

impl OAuthProvider {
    /// Get the provider name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Facebook => "facebook",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "google" => Ok(OAuthProvider::Google),
            "facebook" => Ok(OAuthProvider::Facebook),
            other => Err(format!("Unknown OAuth provider: {}", other)),
        }
    }
}

/// Link between a user and their account at a provider
#[derive(Debug, Clone, PartialEq)]
pub struct OAuth {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: OAuthProvider,
    pub provider_user_id: String,
}

impl OAuth {
    pub fn new(user_id: Uuid, provider: OAuthProvider, provider_user_id: impl Into<String>) -> Self {
        OAuth {
            id: Uuid::new_v4(),
            user_id,
            provider,
            provider_user_id: provider_user_id.into(),
        }
    }
}
