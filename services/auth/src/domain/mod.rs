//! Business objects of the account subsystem
//!
//! These types know nothing about SQL. Services work with them and the
//! repositories translate them to and from [`crate::entities`] through
//! [`crate::mappers`].

pub mod oauth;
pub mod passcode;
pub mod terms_of_use;
pub mod user;

pub use oauth::{OAuth, OAuthProvider};
pub use passcode::{Passcode, PasscodeCategory};
pub use terms_of_use::{SignedTermsOfUse, TermsOfUse};
pub use user::User;
