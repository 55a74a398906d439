//! Terms of use versions and the agreements users signed

use chrono::{DateTime, Utc};
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

/// Row of the `termsofuse` table
#[derive(Debug, Clone, PartialEq)]
pub struct TermsOfUseEntity {
    pub id: Uuid,
    pub created: DateTime<Utc>,
}

impl TermsOfUseEntity {
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(TermsOfUseEntity {
            id: row.try_get("id")?,
            created: row.try_get("created")?,
        })
    }
}

/// Row of the `user_termsofuse` table
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTermsOfUseEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub termsofuse_id: Uuid,
    pub signed: DateTime<Utc>,
}

impl SignedTermsOfUseEntity {
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(SignedTermsOfUseEntity {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            termsofuse_id: row.try_get("termsofuse_id")?,
            signed: row.try_get("signed")?,
        })
    }
}
