//! Persistence records of the account subsystem
//!
//! One struct per table. They carry no behavior beyond decoding themselves
//! from a `PgRow`; business rules live in [`crate::domain`].

pub mod oauth;
pub mod passcode;
pub mod terms_of_use;
pub mod user;

pub use oauth::OAuthEntity;
pub use passcode::PasscodeEntity;
pub use terms_of_use::{SignedTermsOfUseEntity, TermsOfUseEntity};
pub use user::UserEntity;

use uuid::Uuid;

/// Any account record that can be queued in a [`crate::session::Session`]
#[derive(Debug, Clone, PartialEq)]
pub enum EntityRecord {
    User(UserEntity),
    Passcode(PasscodeEntity),
    OAuth(OAuthEntity),
    TermsOfUse(TermsOfUseEntity),
    SignedTermsOfUse(SignedTermsOfUseEntity),
}

impl EntityRecord {
    /// Primary key of the wrapped record
    pub fn id(&self) -> Uuid {
        match self {
            EntityRecord::User(entity) => entity.id,
            EntityRecord::Passcode(entity) => entity.id,
            EntityRecord::OAuth(entity) => entity.id,
            EntityRecord::TermsOfUse(entity) => entity.id,
            EntityRecord::SignedTermsOfUse(entity) => entity.id,
        }
    }

    /// Table the record is stored in
    pub fn table(&self) -> &'static str {
        match self {
            EntityRecord::User(_) => "user",
            EntityRecord::Passcode(_) => "passcode",
            EntityRecord::OAuth(_) => "oauth",
            EntityRecord::TermsOfUse(_) => "termsofuse",
            EntityRecord::SignedTermsOfUse(_) => "user_termsofuse",
        }
    }
}

/// Build a decode error for a column holding an unexpected value
pub(crate) fn decode_error(column: &str, value: &str) -> sqlx::Error {
    sqlx::Error::Decode(format!("unexpected value {:?} in column {}", value, column).into())
}
