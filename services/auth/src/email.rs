//! Transactional email delivery through the SendGrid v3 API

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

/// Default SendGrid endpoint
pub const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Email configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: String,
    pub url: String,
    pub from: String,
}

impl EmailConfig {
    /// Create a new EmailConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SENDGRID_API_KEY`: API key sent as bearer token
    /// - `SENDGRID_URL`: Endpoint (default: SendGrid v3 `mail/send`)
    /// - `EMAIL_FROM`: Sender address (default: "no-reply@livedisplaced.com")
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("SENDGRID_API_KEY")
            .map_err(|_| anyhow::anyhow!("SENDGRID_API_KEY environment variable not set"))?;
        let url = std::env::var("SENDGRID_URL").unwrap_or_else(|_| SENDGRID_URL.to_string());
        let from = std::env::var("EMAIL_FROM")
            .unwrap_or_else(|_| "no-reply@livedisplaced.com".to_string());

        Ok(EmailConfig { api_key, url, from })
    }
}

/// A single HTML message
#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Failed to reach the email provider: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Email provider answered {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Address used in the `from` field of outgoing messages
    fn sender(&self) -> &str;

    async fn send(&self, email: &Email) -> Result<(), EmailError>;
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct SendGridMail<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

impl<'a> From<&'a Email> for SendGridMail<'a> {
    fn from(email: &'a Email) -> Self {
        SendGridMail {
            personalizations: [Personalization {
                to: [Address { email: &email.to }],
            }],
            from: Address { email: &email.from },
            subject: &email.subject,
            content: [Content {
                kind: "text/html",
                value: &email.html_body,
            }],
        }
    }
}

/// SendGrid client
#[derive(Clone)]
pub struct SendGridSender {
    client: reqwest::Client,
    config: EmailConfig,
}

impl SendGridSender {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl EmailSender for SendGridSender {
    fn sender(&self) -> &str {
        &self.config.from
    }

    async fn send(&self, email: &Email) -> Result<(), EmailError> {
        info!("Sending \"{}\" to {}", email.subject, email.to);

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .json(&SendGridMail::from(email))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::ACCEPTED {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        error!("Email provider rejected message: {} {}", status, body);
        Err(EmailError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

/// Activation message with a link to `activation_url`
pub fn activation_email(from: &str, to: &str, first_name: &str, activation_url: &str) -> Email {
    Email {
        from: from.to_string(),
        to: to.to_string(),
        subject: "Activation Email".to_string(),
        html_body: format!(
            "<p>Hello {},</p>\
             <p>Welcome to LiveDisplaced. Please confirm your email address to activate your account:</p>\
             <p><a href=\"{}\">Activate my account</a></p>",
            first_name, activation_url
        ),
    }
}

/// Password reset message with a link to `reset_url`
pub fn reset_email(from: &str, to: &str, first_name: &str, reset_url: &str) -> Email {
    Email {
        from: from.to_string(),
        to: to.to_string(),
        subject: "Reset Email".to_string(),
        html_body: format!(
            "<p>Hello {},</p>\
             <p>A password reset was requested for your account:</p>\
             <p><a href=\"{}\">Choose a new password</a></p>\
             <p>If you did not ask for it, you can ignore this email.</p>",
            first_name, reset_url
        ),
    }
}
