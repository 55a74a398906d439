//! Common library for the LiveDisplaced services
//!
//! This crate provides the pieces shared by the account service, the
//! reporting API and the UNHCR sync job: PostgreSQL connectivity and
//! migrations, database error types, the Redis cache and the displacement
//! categories used across the population dataset.

pub mod cache;
pub mod category;
pub mod database;
pub mod error;

pub use category::DisplacedCategory;
pub use error::{DatabaseError, DatabaseResult};
