//! User record

use chrono::{DateTime, Utc};
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

/// Row of the `"user"` table
#[derive(Debug, Clone, PartialEq)]
pub struct UserEntity {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Absent for accounts created through an OAuth provider
    pub email: Option<String>,
    /// Argon2 PHC string, absent for OAuth accounts
    pub password: Option<String>,
    pub is_active: bool,
    pub created: DateTime<Utc>,
}

impl UserEntity {
    /// Decode a row selected with every column of the table
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserEntity {
            id: row.try_get("id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            is_active: row.try_get("is_active")?,
            created: row.try_get("created")?,
        })
    }
}
