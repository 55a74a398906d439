//! Passcode record

use chrono::{DateTime, Utc};
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

use super::decode_error;
use crate::domain::PasscodeCategory;

/// Row of the `passcode` table
#[derive(Debug, Clone, PartialEq)]
pub struct PasscodeEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: PasscodeCategory,
    pub expiration: DateTime<Utc>,
}

impl PasscodeEntity {
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let category: String = row.try_get("category")?;
        let category = category
            .parse()
            .map_err(|_| decode_error("passcode.category", &category))?;

        Ok(PasscodeEntity {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            category,
            expiration: row.try_get("expiration")?,
        })
    }
}
