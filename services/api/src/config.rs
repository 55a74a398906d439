//! Settings of the reporting API

/// Service configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address the HTTP server binds to
    pub bind_address: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            bind_address: "0.0.0.0:3001".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create a new ApiConfig from environment variables
    ///
    /// # Environment Variables
    /// - `API_BIND_ADDRESS`: (default: "0.0.0.0:3001")
    pub fn from_env() -> Self {
        let defaults = Self::default();

        ApiConfig {
            bind_address: std::env::var("API_BIND_ADDRESS").unwrap_or(defaults.bind_address),
        }
    }
}
