//! Account registration with email activation

use chrono::Utc;
use tracing::info;

use super::{MapNotFound, UserRegistration};
use crate::config::AuthConfig;
use crate::domain::{Passcode, SignedTermsOfUse, User};
use crate::email::{EmailSender, activation_email};
use crate::error::ServiceError;
use crate::password::PasswordHasher;
use crate::unit_of_work::PasscodeUnitOfWork;

pub struct RegistrationService<'a, U> {
    unit_of_work: U,
    hasher: &'a dyn PasswordHasher,
    email_sender: &'a dyn EmailSender,
    config: &'a AuthConfig,
}

impl<'a, U: PasscodeUnitOfWork> RegistrationService<'a, U> {
    pub fn new(
        unit_of_work: U,
        hasher: &'a dyn PasswordHasher,
        email_sender: &'a dyn EmailSender,
        config: &'a AuthConfig,
    ) -> Self {
        Self {
            unit_of_work,
            hasher,
            email_sender,
            config,
        }
    }

    /// Create an inactive account that signed the latest terms, and email
    /// its activation link
    pub async fn register(&self, data: &UserRegistration) -> Result<User, ServiceError> {
        info!("Registering user: {}", data.email);

        let users = self.unit_of_work.user_repository();
        if users.find_by_email(&data.email).await.optional()?.is_some() {
            return Err(ServiceError::EmailAlreadyUsed);
        }

        let mut user = User::new(
            data.first_name.trim(),
            data.last_name.trim(),
            Some(data.email.clone()),
            false,
        );
        user.set_password(&data.password, self.hasher)?;

        let terms = self
            .unit_of_work
            .terms_of_use_repository()
            .find_latest_version()
            .await?;
        let agreement = SignedTermsOfUse::new(user.id, terms.id, Utc::now());
        let passcode = Passcode::activation(user.id, self.config.activation_ttl());

        users.add(&user).await?;
        self.unit_of_work.flush().await?;
        self.unit_of_work
            .signed_terms_of_use_repository()
            .add(&agreement)
            .await?;
        self.unit_of_work.passcode_repository().add(&passcode).await?;
        self.unit_of_work.save().await?;

        let email = activation_email(
            self.email_sender.sender(),
            &data.email,
            &user.first_name,
            &self.config.activation_url(&passcode.id),
        );
        self.email_sender.send(&email).await?;

        info!("User registered: {}", user.id);
        Ok(user)
    }
}
