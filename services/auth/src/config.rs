//! Settings of the authentication service

use chrono::Duration;

/// Service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Public URL used to build links in emails
    pub public_base_url: String,
    /// Lifetime of activation passcodes in hours
    pub activation_token_ttl_hours: i64,
    /// Lifetime of password reset passcodes in minutes
    pub reset_token_ttl_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            bind_address: "0.0.0.0:3000".to_string(),
            public_base_url: "http://localhost:3000".to_string(),
            activation_token_ttl_hours: 24,
            reset_token_ttl_minutes: 15,
        }
    }
}

impl AuthConfig {
    /// Create a new AuthConfig from environment variables
    ///
    /// # Environment Variables
    /// - `AUTH_BIND_ADDRESS`: (default: "0.0.0.0:3000")
    /// - `PUBLIC_BASE_URL`: (default: "http://localhost:3000")
    /// - `ACTIVATION_TOKEN_TTL_HOURS`: (default: 24)
    /// - `RESET_TOKEN_TTL_MINUTES`: (default: 15)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_address = std::env::var("AUTH_BIND_ADDRESS").unwrap_or(defaults.bind_address);
        let public_base_url =
            std::env::var("PUBLIC_BASE_URL").unwrap_or(defaults.public_base_url);
        let activation_token_ttl_hours = std::env::var("ACTIVATION_TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .unwrap_or(24);
        let reset_token_ttl_minutes = std::env::var("RESET_TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| "15".to_string())
            .parse()
            .unwrap_or(15);

        AuthConfig {
            bind_address,
            public_base_url,
            activation_token_ttl_hours,
            reset_token_ttl_minutes,
        }
    }

    pub fn activation_ttl(&self) -> Duration {
        Duration::hours(self.activation_token_ttl_hours)
    }

    pub fn reset_ttl(&self) -> Duration {
        Duration::minutes(self.reset_token_ttl_minutes)
    }

    /// Link put in the activation email
    pub fn activation_url(&self, token: &uuid::Uuid) -> String {
        format!(
            "{}/auth/activate/{}",
            self.public_base_url.trim_end_matches('/'),
            token
        )
    }

    /// Link put in the password reset email
    pub fn reset_url(&self, token: &uuid::Uuid) -> String {
        format!(
            "{}/auth/password/reset/{}",
            self.public_base_url.trim_end_matches('/'),
            token
        )
    }
}
