//! Country as stored by the sync job

use serde::Serialize;
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Country {
    pub id: Uuid,
    pub name: String,
    pub iso: String,
    pub iso_2: Option<String>,
    pub is_recognized: bool,
    pub region_id: Uuid,
}

impl Country {
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Country {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            iso: row.try_get("iso")?,
            iso_2: row.try_get("iso_2")?,
            is_recognized: row.try_get("is_recognized")?,
            region_id: row.try_get("region_id")?,
        })
    }
}
