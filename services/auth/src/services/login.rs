use tracing::{info, warn};

use super::{MapNotFound, UserLogin};
use crate::domain::User;
use crate::error::ServiceError;
use crate::password::PasswordHasher;
use crate::unit_of_work::UserUnitOfWork;

/// Email and password sign-in
pub struct LoginService<'a, U> {
    unit_of_work: U,
    hasher: &'a dyn PasswordHasher,
}

impl<'a, U: UserUnitOfWork> LoginService<'a, U> {
    pub fn new(unit_of_work: U, hasher: &'a dyn PasswordHasher) -> Self {
        Self {
            unit_of_work,
            hasher,
        }
    }

    /// Unknown email and wrong password are indistinguishable to the caller
    pub async fn login(&self, data: &UserLogin) -> Result<User, ServiceError> {
        info!("Login attempt: {}", data.email);

        let user = self
            .unit_of_work
            .user_repository()
            .find_by_email(&data.email)
            .await
            .map_not_found(ServiceError::UserAccountNotFound)?;

        if !user.verify_password(&data.password, self.hasher) {
            warn!("Wrong password for user: {}", user.id);
            return Err(ServiceError::UserAccountNotFound);
        }
        if !user.is_active {
            return Err(ServiceError::UserAccountNotActivated);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeStore, FakeUnitOfWork, PlainHasher};

    fn store_with(active: bool) -> FakeStore {
        let mut user = User::new("Ada", "Lovelace", Some("ada@example.com".into()), active);
        user.set_password("Sup3r$ecret", &PlainHasher).unwrap();
        FakeStore {
            users: vec![user],
            ..Default::default()
        }
    }

    fn credentials(password: &str) -> UserLogin {
        UserLogin {
            email: "ada@example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_active_user() {
        let uow = FakeUnitOfWork::new(store_with(true));
        let service = LoginService::new(uow, &PlainHasher);

        let user = service.login(&credentials("Sup3r$ecret")).await.unwrap();
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn test_wrong_password_looks_like_unknown_account() {
        let uow = FakeUnitOfWork::new(store_with(true));
        let service = LoginService::new(uow, &PlainHasher);

        let result = service.login(&credentials("wrong")).await;
        assert!(matches!(result, Err(ServiceError::UserAccountNotFound)));

        let unknown = UserLogin {
            email: "nobody@example.com".to_string(),
            password: "Sup3r$ecret".to_string(),
        };
        let result = service.login(&unknown).await;
        assert!(matches!(result, Err(ServiceError::UserAccountNotFound)));
    }

    #[tokio::test]
    async fn test_inactive_account_is_refused() {
        let uow = FakeUnitOfWork::new(store_with(false));
        let service = LoginService::new(uow, &PlainHasher);

        let result = service.login(&credentials("Sup3r$ecret")).await;
        assert!(matches!(result, Err(ServiceError::UserAccountNotActivated)));
    }
}
