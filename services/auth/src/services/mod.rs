//! Account use cases
//!
//! A service is built per request around a fresh unit of work and the
//! collaborators it needs, then consumed by one call.

use common::DatabaseResult;
use serde::Deserialize;

use crate::error::ServiceError;

pub mod account;
pub mod compliance;
pub mod login;
pub mod oauth_login;
pub mod password_reset;
pub mod registration;

pub use account::{ActivateUserService, DeleteAccountService, UpdateAccountPasswordService};
pub use compliance::{UserCompliancePermissionService, UserComplianceService};
pub use login::LoginService;
pub use oauth_login::OAuthLoginService;
pub use password_reset::{PasswordResetService, RequestPasswordResetService};
pub use registration::RegistrationService;

/// Data needed to open an account with an email and password
#[derive(Debug, Clone, Deserialize)]
pub struct UserRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserLogin {
    pub email: String,
    pub password: String,
}

/// Translate a missing row into a business error
pub(crate) trait MapNotFound<T> {
    fn map_not_found(self, error: ServiceError) -> Result<T, ServiceError>;

    /// `None` instead of `NoEntityFound`
    fn optional(self) -> Result<Option<T>, ServiceError>;
}

impl<T> MapNotFound<T> for DatabaseResult<T> {
    fn map_not_found(self, error: ServiceError) -> Result<T, ServiceError> {
        match self {
            Ok(value) => Ok(value),
            Err(e) if e.is_not_found() => Err(error),
            Err(e) => Err(e.into()),
        }
    }

    fn optional(self) -> Result<Option<T>, ServiceError> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
