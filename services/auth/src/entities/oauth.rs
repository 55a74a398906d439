//! Linked OAuth identity record

use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

use super::decode_error;
use crate::domain::OAuthProvider;

/// Row of the `oauth` table
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: OAuthProvider,
    pub provider_user_id: String,
}

impl OAuthEntity {
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let provider: String = row.try_get("provider")?;
        let provider = provider
            .parse()
            .map_err(|_| decode_error("oauth.provider", &provider))?;

        Ok(OAuthEntity {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            provider,
            provider_user_id: row.try_get("provider_user_id")?,
        })
    }
}
