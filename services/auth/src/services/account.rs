//! Activation, password change and deletion of an existing account

use tracing::info;
use uuid::Uuid;

use super::MapNotFound;
use crate::domain::User;
use crate::error::ServiceError;
use crate::password::PasswordHasher;
use crate::unit_of_work::{PasscodeUnitOfWork, UserUnitOfWork};

pub struct ActivateUserService<U> {
    unit_of_work: U,
}

impl<U: PasscodeUnitOfWork> ActivateUserService<U> {
    pub fn new(unit_of_work: U) -> Self {
        Self { unit_of_work }
    }

    /// Consume an unexpired activation passcode and activate its owner
    pub async fn activate(&self, token: Uuid) -> Result<User, ServiceError> {
        info!("Activating account with token: {}", token);

        let passcodes = self.unit_of_work.passcode_repository();
        let passcode = passcodes
            .find_activation_by_uid_before_exp(token)
            .await
            .map_not_found(ServiceError::InvalidActivationToken)?;

        let users = self.unit_of_work.user_repository();
        let mut user = users
            .find_by_id(passcode.user_id)
            .await
            .map_not_found(ServiceError::UserAccountNotFound)?;
        user.set_active();

        users.modify(&user).await?;
        passcodes.remove(&passcode).await?;
        self.unit_of_work.save().await?;

        info!("Account activated: {}", user.id);
        Ok(user)
    }
}

pub struct UpdateAccountPasswordService<'a, U> {
    unit_of_work: U,
    hasher: &'a dyn PasswordHasher,
}

impl<'a, U: UserUnitOfWork> UpdateAccountPasswordService<'a, U> {
    pub fn new(unit_of_work: U, hasher: &'a dyn PasswordHasher) -> Self {
        Self {
            unit_of_work,
            hasher,
        }
    }

    pub async fn update_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        info!("Updating password of user: {}", user_id);

        let users = self.unit_of_work.user_repository();
        let mut user = users
            .find_by_id(user_id)
            .await
            .map_not_found(ServiceError::UserAccountNotFound)?;

        if !user.verify_password(current_password, self.hasher) {
            return Err(ServiceError::IncorrectPassword);
        }

        user.set_password(new_password, self.hasher)?;
        users.modify(&user).await?;
        self.unit_of_work.save().await?;
        Ok(())
    }
}

pub struct DeleteAccountService<U> {
    unit_of_work: U,
}

impl<U: UserUnitOfWork> DeleteAccountService<U> {
    pub fn new(unit_of_work: U) -> Self {
        Self { unit_of_work }
    }

    /// Passcodes, agreements and OAuth links go with the account
    pub async fn delete(&self, user_id: Uuid) -> Result<(), ServiceError> {
        info!("Deleting account: {}", user_id);

        let users = self.unit_of_work.user_repository();
        let user = users
            .find_by_id(user_id)
            .await
            .map_not_found(ServiceError::UserAccountNotFound)?;

        users.remove(&user).await?;
        self.unit_of_work.save().await?;
        Ok(())
    }
}
