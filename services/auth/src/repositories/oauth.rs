//! Linked OAuth identity repository

use async_trait::async_trait;
use common::DatabaseResult;
use sqlx::{PgConnection, postgres::PgQueryResult};
use tracing::info;
use uuid::Uuid;

use super::{OAuthRepository, find_first};
use crate::domain::{OAuth, OAuthProvider};
use crate::entities::{EntityRecord, OAuthEntity};
use crate::mappers;
use crate::unit_of_work::UowHandle;

#[derive(Clone)]
pub struct PgOAuthRepository {
    uow: UowHandle,
}

impl PgOAuthRepository {
    pub fn new(uow: UowHandle) -> Self {
        Self { uow }
    }
}

async fn fetch_by_id(conn: &mut PgConnection, id: Uuid) -> DatabaseResult<OAuthEntity> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, provider, provider_user_id
        FROM oauth
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(OAuthEntity::from_row(&find_first(row, "oauth")?)?)
}

pub(crate) async fn insert(
    conn: &mut PgConnection,
    entity: &OAuthEntity,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO oauth (id, user_id, provider, provider_user_id)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(entity.id)
    .bind(entity.user_id)
    .bind(entity.provider.as_str())
    .bind(&entity.provider_user_id)
    .execute(conn)
    .await?;

    Ok(())
}

pub(crate) async fn update(
    conn: &mut PgConnection,
    entity: &OAuthEntity,
) -> Result<PgQueryResult, sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE oauth
        SET user_id = $2, provider = $3, provider_user_id = $4
        WHERE id = $1
        "#,
    )
    .bind(entity.id)
    .bind(entity.user_id)
    .bind(entity.provider.as_str())
    .bind(&entity.provider_user_id)
    .execute(conn)
    .await
}

#[async_trait]
impl OAuthRepository for PgOAuthRepository {
    async fn add(&self, oauth: &OAuth) -> DatabaseResult<OAuthEntity> {
        info!("Adding {} identity for user: {}", oauth.provider, oauth.user_id);

        let entity = mappers::oauth::to_entity(oauth);
        let mut state = self.uow.lock().await;
        state.session.add(EntityRecord::OAuth(entity.clone()));
        Ok(entity)
    }

    async fn modify(&self, oauth: &OAuth) -> DatabaseResult<OAuthEntity> {
        info!("Modifying OAuth identity: {}", oauth.id);

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        let mut entity = fetch_by_id(conn, oauth.id).await?;
        mappers::oauth::map_to_entity(oauth, &mut entity);
        state.db.track(EntityRecord::OAuth(entity.clone()));
        Ok(entity)
    }

    async fn remove(&self, oauth: &OAuth) -> DatabaseResult<OAuthEntity> {
        info!("Removing OAuth identity: {}", oauth.id);

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        let entity = fetch_by_id(conn, oauth.id).await?;
        state.session.remove(EntityRecord::OAuth(entity.clone()));
        Ok(entity)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<OAuth> {
        info!("Finding OAuth identity by ID: {}", id);

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        Ok(mappers::oauth::to_domain(fetch_by_id(conn, id).await?))
    }

    async fn find_by_provider_by_uid(
        &self,
        provider: OAuthProvider,
        provider_user_id: &str,
    ) -> DatabaseResult<OAuth> {
        info!("Finding {} identity: {}", provider, provider_user_id);

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        let row = sqlx::query(
            r#"
            SELECT id, user_id, provider, provider_user_id
            FROM oauth
            WHERE provider = $1 AND provider_user_id = $2
            LIMIT 1
            "#,
        )
        .bind(provider.as_str())
        .bind(provider_user_id)
        .fetch_optional(conn)
        .await?;

        let entity = OAuthEntity::from_row(&find_first(row, "oauth")?)?;
        Ok(mappers::oauth::to_domain(entity))
    }
}
