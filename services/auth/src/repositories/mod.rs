//! Repositories of the account aggregates
//!
//! Each trait is one repository role. The PostgreSQL implementations share
//! the session and transaction of the unit of work that created them:
//! `add` and `remove` only queue an intent, `modify` loads the row and
//! tracks it, and nothing is written before the unit of work flushes.

use async_trait::async_trait;
use common::{DatabaseError, DatabaseResult};
use uuid::Uuid;

use crate::domain::{OAuth, OAuthProvider, Passcode, SignedTermsOfUse, TermsOfUse, User};
use crate::entities::{
    OAuthEntity, PasscodeEntity, SignedTermsOfUseEntity, TermsOfUseEntity, UserEntity,
};

pub mod oauth;
pub mod passcode;
pub mod terms_of_use;
pub mod user;

pub use oauth::PgOAuthRepository;
pub use passcode::PgPasscodeRepository;
pub use terms_of_use::{PgSignedTermsOfUseRepository, PgTermsOfUseRepository};
pub use user::PgUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn add(&self, user: &User) -> DatabaseResult<UserEntity>;
    async fn modify(&self, user: &User) -> DatabaseResult<UserEntity>;
    async fn remove(&self, user: &User) -> DatabaseResult<UserEntity>;
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<User>;
    async fn find_by_email(&self, email: &str) -> DatabaseResult<User>;
}

#[async_trait]
pub trait PasscodeRepository: Send + Sync {
    async fn add(&self, passcode: &Passcode) -> DatabaseResult<PasscodeEntity>;
    async fn modify(&self, passcode: &Passcode) -> DatabaseResult<PasscodeEntity>;
    async fn remove(&self, passcode: &Passcode) -> DatabaseResult<PasscodeEntity>;
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Passcode>;
    async fn find_activation_by_user(&self, user: &User) -> DatabaseResult<Passcode>;
    async fn find_reset_by_user(&self, user: &User) -> DatabaseResult<Passcode>;
    /// Unexpired activation passcode with this id
    async fn find_activation_by_uid_before_exp(&self, id: Uuid) -> DatabaseResult<Passcode>;
    /// Unexpired reset passcode with this id
    async fn find_reset_by_uid_before_exp(&self, id: Uuid) -> DatabaseResult<Passcode>;
}

#[async_trait]
pub trait OAuthRepository: Send + Sync {
    async fn add(&self, oauth: &OAuth) -> DatabaseResult<OAuthEntity>;
    async fn modify(&self, oauth: &OAuth) -> DatabaseResult<OAuthEntity>;
    async fn remove(&self, oauth: &OAuth) -> DatabaseResult<OAuthEntity>;
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<OAuth>;
    async fn find_by_provider_by_uid(
        &self,
        provider: OAuthProvider,
        provider_user_id: &str,
    ) -> DatabaseResult<OAuth>;
}

#[async_trait]
pub trait TermsOfUseRepository: Send + Sync {
    async fn add(&self, terms: &TermsOfUse) -> DatabaseResult<TermsOfUseEntity>;
    async fn modify(&self, terms: &TermsOfUse) -> DatabaseResult<TermsOfUseEntity>;
    async fn remove(&self, terms: &TermsOfUse) -> DatabaseResult<TermsOfUseEntity>;
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<TermsOfUse>;
    /// Version with the greatest `created`
    async fn find_latest_version(&self) -> DatabaseResult<TermsOfUse>;
}

#[async_trait]
pub trait SignedTermsOfUseRepository: Send + Sync {
    async fn add(&self, agreement: &SignedTermsOfUse) -> DatabaseResult<SignedTermsOfUseEntity>;
    async fn modify(&self, agreement: &SignedTermsOfUse)
    -> DatabaseResult<SignedTermsOfUseEntity>;
    async fn remove(&self, agreement: &SignedTermsOfUse)
    -> DatabaseResult<SignedTermsOfUseEntity>;
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<SignedTermsOfUse>;
    /// Agreement the user signed most recently
    async fn find_latest_compliant_term_per_user(
        &self,
        user_id: Uuid,
    ) -> DatabaseResult<SignedTermsOfUse>;
}

/// Turn an optional single-row result into the record or `NoEntityFound`
pub(crate) fn find_first<T>(row: Option<T>, entity: &'static str) -> DatabaseResult<T> {
    row.ok_or(DatabaseError::NoEntityFound(entity))
}
