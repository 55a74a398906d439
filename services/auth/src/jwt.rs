//! Access tokens
//!
//! Tokens are RS256-signed JWTs carrying the user id. Signing out adds the
//! token to a Redis blacklist until it would have expired anyway.

use anyhow::Result;
use common::cache::RedisPool;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use uuid::Uuid;

use crate::domain::User;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Private key for signing tokens
    pub private_key: String,
    /// Public key for verifying tokens
    pub public_key: String,
    /// Access token expiration time in seconds (default: 15 minutes)
    pub access_token_expiry: u64,
}

/// PEM given inline, or read from a file path
fn read_key(var: &str) -> Result<String> {
    let value =
        std::env::var(var).map_err(|_| anyhow::anyhow!("{} environment variable not set", var))?;

    if value.starts_with("-----BEGIN") {
        return Ok(value);
    }

    let pem = std::fs::read_to_string(&value)
        .or_else(|_| {
            let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
            path.push(&value);
            std::fs::read_to_string(path)
        })
        .map_err(|e| anyhow::anyhow!("Failed to read {} file: {}", var, e))?;
    Ok(pem.trim().to_string())
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_PRIVATE_KEY`: Private key (PEM) or path to it
    /// - `JWT_PUBLIC_KEY`: Public key (PEM) or path to it
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 900)
    pub fn from_env() -> Result<Self> {
        let private_key = read_key("JWT_PRIVATE_KEY")?;
        let public_key = read_key("JWT_PUBLIC_KEY")?;

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .unwrap_or(900);

        Ok(JwtConfig {
            private_key,
            public_key,
            access_token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token ID
    pub jti: Uuid,
}

/// Token returned on a successful sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

fn now() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
        .as_secs())
}

fn blacklist_key(token: &str) -> String {
    format!("blacklisted_token:{}", token)
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_expiry: u64,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(config.private_key.as_bytes())?;
        let decoding_key = DecodingKey::from_rsa_pem(config.public_key.as_bytes())?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;

        Ok(JwtService {
            encoding_key,
            decoding_key,
            validation,
            access_token_expiry: config.access_token_expiry,
        })
    }

    pub fn generate_access_token(&self, user: &User) -> Result<String> {
        let now = now()?;
        let claims = Claims {
            sub: user.id,
            iat: now,
            exp: now + self.access_token_expiry,
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Bearer token response for a signed-in user
    pub fn issue(&self, user: &User) -> Result<TokenResponse> {
        info!("Issuing access token for user: {}", user.id);

        Ok(TokenResponse {
            access_token: self.generate_access_token(user)?,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    pub async fn is_token_blacklisted(&self, redis_pool: &RedisPool, token: &str) -> Result<bool> {
        Ok(redis_pool.get(&blacklist_key(token)).await?.is_some())
    }

    /// Refuse the token until it expires
    pub async fn blacklist_token(&self, redis_pool: &RedisPool, token: &str, exp: u64) -> Result<()> {
        let remaining = exp.saturating_sub(now()?);
        if remaining == 0 {
            return Ok(());
        }
        redis_pool
            .set(&blacklist_key(token), "1", Some(remaining))
            .await
    }

    pub fn access_token_expiry(&self) -> u64 {
        self.access_token_expiry
    }
}
