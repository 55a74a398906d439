//! Forgotten password flow
//!
//! A user holds at most one reset passcode. Requesting a new one replaces
//! the previous one, and using it removes it.

use tracing::info;
use uuid::Uuid;

use super::MapNotFound;
use crate::config::AuthConfig;
use crate::domain::{Passcode, User};
use crate::email::{EmailSender, reset_email};
use crate::error::ServiceError;
use crate::password::PasswordHasher;
use crate::unit_of_work::PasscodeUnitOfWork;

pub struct RequestPasswordResetService<'a, U> {
    unit_of_work: U,
    email_sender: &'a dyn EmailSender,
    config: &'a AuthConfig,
}

impl<'a, U: PasscodeUnitOfWork> RequestPasswordResetService<'a, U> {
    pub fn new(unit_of_work: U, email_sender: &'a dyn EmailSender, config: &'a AuthConfig) -> Self {
        Self {
            unit_of_work,
            email_sender,
            config,
        }
    }

    pub async fn request_reset(&self, email: &str) -> Result<Passcode, ServiceError> {
        info!("Password reset requested for: {}", email);

        let user = self
            .unit_of_work
            .user_repository()
            .find_by_email(email)
            .await
            .map_not_found(ServiceError::incorrect_input("email", "Email not found"))?;

        let passcodes = self.unit_of_work.passcode_repository();
        match passcodes.find_reset_by_user(&user).await.optional()? {
            Some(previous) => {
                passcodes.remove(&previous).await?;
                // The unique (user, category) pair forbids two rows at once
                self.unit_of_work.flush().await?;
            }
            None => info!("No reset token found, creating a new one"),
        }

        let passcode = Passcode::reset(user.id, self.config.reset_ttl());
        passcodes.add(&passcode).await?;
        self.unit_of_work.save().await?;

        let email = reset_email(
            self.email_sender.sender(),
            email,
            &user.first_name,
            &self.config.reset_url(&passcode.id),
        );
        self.email_sender.send(&email).await?;

        Ok(passcode)
    }
}

pub struct PasswordResetService<'a, U> {
    unit_of_work: U,
    hasher: &'a dyn PasswordHasher,
}

impl<'a, U: PasscodeUnitOfWork> PasswordResetService<'a, U> {
    pub fn new(unit_of_work: U, hasher: &'a dyn PasswordHasher) -> Self {
        Self {
            unit_of_work,
            hasher,
        }
    }

    /// Owner of an unexpired reset passcode
    pub async fn check_token(&self, token: Uuid) -> Result<User, ServiceError> {
        let passcode = self
            .unit_of_work
            .passcode_repository()
            .find_reset_by_uid_before_exp(token)
            .await
            .map_not_found(ServiceError::InvalidResetToken)?;

        self.unit_of_work
            .user_repository()
            .find_by_id(passcode.user_id)
            .await
            .map_not_found(ServiceError::InvalidResetToken)
    }

    pub async fn reset_password(&self, token: Uuid, new_password: &str) -> Result<(), ServiceError> {
        info!("Resetting password with token: {}", token);

        let passcodes = self.unit_of_work.passcode_repository();
        let passcode = passcodes
            .find_reset_by_uid_before_exp(token)
            .await
            .map_not_found(ServiceError::InvalidResetToken)?;

        let users = self.unit_of_work.user_repository();
        let mut user = users
            .find_by_id(passcode.user_id)
            .await
            .map_not_found(ServiceError::InvalidResetToken)?;
        user.set_password(new_password, self.hasher)?;

        users.modify(&user).await?;
        passcodes.remove(&passcode).await?;
        self.unit_of_work.save().await?;

        info!("Password reset for user: {}", user.id);
        Ok(())
    }
}
