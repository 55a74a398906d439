//! OAuth2 integration for Google and Facebook providers

use async_trait::async_trait;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl, basic::BasicClient,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::OAuthProvider;

/// How long an authorization attempt stays valid in Redis
pub const OAUTH_STATE_TTL_SECONDS: u64 = 600;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("OAuth configuration error: {0}")]
    Configuration(String),

    #[error("OAuth code exchange failed: {0}")]
    Exchange(String),

    #[error("OAuth profile request failed: {0}")]
    Profile(String),
}

/// Client credentials of one provider
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// OAuth2 configuration for every provider
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub google: Option<ProviderCredentials>,
    pub facebook: Option<ProviderCredentials>,
    /// Public URL the providers redirect back to, without the callback path
    pub redirect_base_url: String,
}

impl OAuthConfig {
    /// Create a new OAuthConfig from environment variables
    ///
    /// A provider is enabled only when both its id and secret are set.
    ///
    /// # Environment Variables
    /// - `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`
    /// - `FACEBOOK_CLIENT_ID`, `FACEBOOK_CLIENT_SECRET`
    /// - `OAUTH_REDIRECT_BASE_URL`: (default: "http://localhost:3000")
    pub fn from_env() -> Self {
        let credentials = |id: &str, secret: &str| match (std::env::var(id), std::env::var(secret))
        {
            (Ok(client_id), Ok(client_secret)) => Some(ProviderCredentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        OAuthConfig {
            google: credentials("GOOGLE_CLIENT_ID", "GOOGLE_CLIENT_SECRET"),
            facebook: credentials("FACEBOOK_CLIENT_ID", "FACEBOOK_CLIENT_SECRET"),
            redirect_base_url: std::env::var("OAUTH_REDIRECT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }

    /// Callback URL registered at the provider
    pub fn redirect_url(&self, provider: OAuthProvider) -> String {
        format!(
            "{}/auth/oauth/{}/callback",
            self.redirect_base_url.trim_end_matches('/'),
            provider
        )
    }
}

/// Where to send the browser, and what to remember until it comes back
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub csrf_state: String,
    pub pkce_verifier: String,
}

/// Provider profile normalized to the fields an account needs
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthProfile {
    pub first_name: String,
    pub last_name: String,
    pub provider_user_id: String,
}

/// Authorization-code flow against one provider
#[async_trait]
pub trait OAuthClient: Send + Sync {
    fn provider(&self) -> OAuthProvider;

    /// Authorization URL with a fresh CSRF state and PKCE challenge
    fn authorization_url(&self) -> AuthorizationRequest;

    async fn exchange_code_for_profile(
        &self,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<OAuthProfile, OAuthError>;
}

/// Enabled providers by name
pub type OAuthClients = HashMap<OAuthProvider, Arc<dyn OAuthClient>>;

/// Build a client for every provider that has credentials
pub fn clients_from_config(config: &OAuthConfig) -> Result<OAuthClients, OAuthError> {
    let mut clients: OAuthClients = HashMap::new();

    if let Some(credentials) = &config.google {
        let client = ProviderClient::new_google(credentials, &config.redirect_url(OAuthProvider::Google))?;
        clients.insert(OAuthProvider::Google, Arc::new(client));
    }
    if let Some(credentials) = &config.facebook {
        let client =
            ProviderClient::new_facebook(credentials, &config.redirect_url(OAuthProvider::Facebook))?;
        clients.insert(OAuthProvider::Facebook, Arc::new(client));
    }

    if clients.is_empty() {
        warn!("No OAuth provider configured");
    }
    Ok(clients)
}

/// OAuth2 client wrapper
#[derive(Clone)]
pub struct ProviderClient {
    provider: OAuthProvider,
    client: BasicClient,
    scopes: &'static [&'static str],
    profile_url: &'static str,
    http: reqwest::Client,
}

impl ProviderClient {
    /// Create a new OAuth2 client for Google
    pub fn new_google(credentials: &ProviderCredentials, redirect_url: &str) -> Result<Self, OAuthError> {
        let client = basic_client(
            credentials,
            "https://accounts.google.com/o/oauth2/v2/auth",
            "https://oauth2.googleapis.com/token",
            redirect_url,
        )?;

        Ok(Self {
            provider: OAuthProvider::Google,
            client,
            scopes: &["openid", "profile"],
            profile_url: "https://openidconnect.googleapis.com/v1/userinfo",
            http: reqwest::Client::new(),
        })
    }

    /// Create a new OAuth2 client for Facebook
    pub fn new_facebook(
        credentials: &ProviderCredentials,
        redirect_url: &str,
    ) -> Result<Self, OAuthError> {
        // Facebook only reads the secret from the request body
        let client = basic_client(
            credentials,
            "https://www.facebook.com/v18.0/dialog/oauth",
            "https://graph.facebook.com/v18.0/oauth/access_token",
            redirect_url,
        )?
        .set_auth_type(AuthType::RequestBody);

        Ok(Self {
            provider: OAuthProvider::Facebook,
            client,
            scopes: &["public_profile"],
            profile_url: "https://graph.facebook.com/me?fields=id,first_name,last_name",
            http: reqwest::Client::new(),
        })
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<OAuthProfile, OAuthError> {
        let response = self
            .http
            .get(self.profile_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OAuthError::Profile(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::Profile(format!(
                "{} profile endpoint answered {}",
                self.provider,
                response.status()
            )));
        }

        let profile = match self.provider {
            OAuthProvider::Google => response
                .json::<GoogleProfile>()
                .await
                .map(OAuthProfile::from),
            OAuthProvider::Facebook => response
                .json::<FacebookProfile>()
                .await
                .map(OAuthProfile::from),
        };
        profile.map_err(|e| OAuthError::Profile(e.to_string()))
    }
}

fn basic_client(
    credentials: &ProviderCredentials,
    auth_url: &str,
    token_url: &str,
    redirect_url: &str,
) -> Result<BasicClient, OAuthError> {
    let invalid = |e: oauth2::url::ParseError| OAuthError::Configuration(e.to_string());

    Ok(BasicClient::new(
        ClientId::new(credentials.client_id.clone()),
        Some(ClientSecret::new(credentials.client_secret.clone())),
        AuthUrl::new(auth_url.to_string()).map_err(invalid)?,
        Some(TokenUrl::new(token_url.to_string()).map_err(invalid)?),
    )
    .set_redirect_uri(RedirectUrl::new(redirect_url.to_string()).map_err(invalid)?))
}

#[async_trait]
impl OAuthClient for ProviderClient {
    fn provider(&self) -> OAuthProvider {
        self.provider
    }

    fn authorization_url(&self) -> AuthorizationRequest {
        info!("Generating authorization URL for {}", self.provider);

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut request = self
            .client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge);

        for scope in self.scopes {
            request = request.add_scope(Scope::new(scope.to_string()));
        }

        let (auth_url, csrf_token) = request.url();

        AuthorizationRequest {
            url: auth_url.to_string(),
            csrf_state: csrf_token.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        }
    }

    async fn exchange_code_for_profile(
        &self,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<OAuthProfile, OAuthError> {
        info!("Exchanging authorization code for {}", self.provider);

        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .request_async(oauth2::reqwest::async_http_client)
            .await
            .map_err(|e| OAuthError::Exchange(e.to_string()))?;

        self.fetch_profile(token_response.access_token().secret())
            .await
    }
}

/// Google OpenID Connect userinfo response
#[derive(Debug, Deserialize)]
struct GoogleProfile {
    sub: String,
    #[serde(default)]
    given_name: String,
    #[serde(default)]
    family_name: String,
}

impl From<GoogleProfile> for OAuthProfile {
    fn from(profile: GoogleProfile) -> Self {
        OAuthProfile {
            first_name: profile.given_name,
            last_name: profile.family_name,
            provider_user_id: profile.sub,
        }
    }
}

/// Facebook Graph API `/me` response
#[derive(Debug, Deserialize)]
struct FacebookProfile {
    id: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
}

impl From<FacebookProfile> for OAuthProfile {
    fn from(profile: FacebookProfile) -> Self {
        OAuthProfile {
            first_name: profile.first_name,
            last_name: profile.last_name,
            provider_user_id: profile.id,
        }
    }
}

/// OAuth session data stored in Redis between redirect and callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthSession {
    pub csrf_token: String,
    pub pkce_verifier: String,
    pub provider: OAuthProvider,
    pub created_at: i64,
}

impl OAuthSession {
    /// Redis key of the session for a CSRF state
    pub fn key(csrf_state: &str) -> String {
        format!("oauth_state:{}", csrf_state)
    }
}
