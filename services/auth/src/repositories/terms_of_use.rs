//! Terms of use and signed agreement repositories

use async_trait::async_trait;
use common::DatabaseResult;
use sqlx::{PgConnection, postgres::PgQueryResult};
use tracing::info;
use uuid::Uuid;

use super::{SignedTermsOfUseRepository, TermsOfUseRepository, find_first};
use crate::domain::{SignedTermsOfUse, TermsOfUse};
use crate::entities::{EntityRecord, SignedTermsOfUseEntity, TermsOfUseEntity};
use crate::mappers;
use crate::unit_of_work::UowHandle;

#[derive(Clone)]
pub struct PgTermsOfUseRepository {
    uow: UowHandle,
}

impl PgTermsOfUseRepository {
    pub fn new(uow: UowHandle) -> Self {
        Self { uow }
    }
}

async fn fetch_terms(conn: &mut PgConnection, id: Uuid) -> DatabaseResult<TermsOfUseEntity> {
    let row = sqlx::query("SELECT id, created FROM termsofuse WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(TermsOfUseEntity::from_row(&find_first(row, "terms of use")?)?)
}

pub(crate) async fn insert_terms(
    conn: &mut PgConnection,
    entity: &TermsOfUseEntity,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO termsofuse (id, created) VALUES ($1, $2)")
        .bind(entity.id)
        .bind(entity.created)
        .execute(conn)
        .await?;
    Ok(())
}

pub(crate) async fn update_terms(
    conn: &mut PgConnection,
    entity: &TermsOfUseEntity,
) -> Result<PgQueryResult, sqlx::Error> {
    sqlx::query("UPDATE termsofuse SET created = $2 WHERE id = $1")
        .bind(entity.id)
        .bind(entity.created)
        .execute(conn)
        .await
}

#[async_trait]
impl TermsOfUseRepository for PgTermsOfUseRepository {
    async fn add(&self, terms: &TermsOfUse) -> DatabaseResult<TermsOfUseEntity> {
        info!("Adding terms of use version: {}", terms.id);

        let entity = mappers::terms_of_use::to_entity(terms);
        let mut state = self.uow.lock().await;
        state.session.add(EntityRecord::TermsOfUse(entity.clone()));
        Ok(entity)
    }

    async fn modify(&self, terms: &TermsOfUse) -> DatabaseResult<TermsOfUseEntity> {
        info!("Modifying terms of use version: {}", terms.id);

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        let mut entity = fetch_terms(conn, terms.id).await?;
        mappers::terms_of_use::map_to_entity(terms, &mut entity);
        state.db.track(EntityRecord::TermsOfUse(entity.clone()));
        Ok(entity)
    }

    async fn remove(&self, terms: &TermsOfUse) -> DatabaseResult<TermsOfUseEntity> {
        info!("Removing terms of use version: {}", terms.id);

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        let entity = fetch_terms(conn, terms.id).await?;
        state.session.remove(EntityRecord::TermsOfUse(entity.clone()));
        Ok(entity)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<TermsOfUse> {
        info!("Finding terms of use version: {}", id);

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        Ok(mappers::terms_of_use::to_domain(fetch_terms(conn, id).await?))
    }

    async fn find_latest_version(&self) -> DatabaseResult<TermsOfUse> {
        info!("Finding latest terms of use version");

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        let row = sqlx::query("SELECT id, created FROM termsofuse ORDER BY created DESC LIMIT 1")
            .fetch_optional(conn)
            .await?;

        let entity = TermsOfUseEntity::from_row(&find_first(row, "terms of use")?)?;
        Ok(mappers::terms_of_use::to_domain(entity))
    }
}

#[derive(Clone)]
pub struct PgSignedTermsOfUseRepository {
    uow: UowHandle,
}

impl PgSignedTermsOfUseRepository {
    pub fn new(uow: UowHandle) -> Self {
        Self { uow }
    }
}

async fn fetch_signed(
    conn: &mut PgConnection,
    id: Uuid,
) -> DatabaseResult<SignedTermsOfUseEntity> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, termsofuse_id, signed
        FROM user_termsofuse
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(SignedTermsOfUseEntity::from_row(&find_first(
        row,
        "signed terms of use",
    )?)?)
}

pub(crate) async fn insert_signed(
    conn: &mut PgConnection,
    entity: &SignedTermsOfUseEntity,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO user_termsofuse (id, user_id, termsofuse_id, signed)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(entity.id)
    .bind(entity.user_id)
    .bind(entity.termsofuse_id)
    .bind(entity.signed)
    .execute(conn)
    .await?;
    Ok(())
}

pub(crate) async fn update_signed(
    conn: &mut PgConnection,
    entity: &SignedTermsOfUseEntity,
) -> Result<PgQueryResult, sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE user_termsofuse
        SET user_id = $2, termsofuse_id = $3, signed = $4
        WHERE id = $1
        "#,
    )
    .bind(entity.id)
    .bind(entity.user_id)
    .bind(entity.termsofuse_id)
    .bind(entity.signed)
    .execute(conn)
    .await
}

#[async_trait]
impl SignedTermsOfUseRepository for PgSignedTermsOfUseRepository {
    async fn add(&self, agreement: &SignedTermsOfUse) -> DatabaseResult<SignedTermsOfUseEntity> {
        info!(
            "Adding agreement of user {} to terms {}",
            agreement.user_id, agreement.termsofuse_id
        );

        let entity = mappers::signed_terms_of_use::to_entity(agreement);
        let mut state = self.uow.lock().await;
        state
            .session
            .add(EntityRecord::SignedTermsOfUse(entity.clone()));
        Ok(entity)
    }

    async fn modify(
        &self,
        agreement: &SignedTermsOfUse,
    ) -> DatabaseResult<SignedTermsOfUseEntity> {
        info!("Modifying agreement: {}", agreement.id);

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        let mut entity = fetch_signed(conn, agreement.id).await?;
        mappers::signed_terms_of_use::map_to_entity(agreement, &mut entity);
        state
            .db
            .track(EntityRecord::SignedTermsOfUse(entity.clone()));
        Ok(entity)
    }

    async fn remove(
        &self,
        agreement: &SignedTermsOfUse,
    ) -> DatabaseResult<SignedTermsOfUseEntity> {
        info!("Removing agreement: {}", agreement.id);

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        let entity = fetch_signed(conn, agreement.id).await?;
        state
            .session
            .remove(EntityRecord::SignedTermsOfUse(entity.clone()));
        Ok(entity)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<SignedTermsOfUse> {
        info!("Finding agreement: {}", id);

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        Ok(mappers::signed_terms_of_use::to_domain(
            fetch_signed(conn, id).await?,
        ))
    }

    async fn find_latest_compliant_term_per_user(
        &self,
        user_id: Uuid,
    ) -> DatabaseResult<SignedTermsOfUse> {
        info!("Finding latest agreement of user: {}", user_id);

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        let row = sqlx::query(
            r#"
            SELECT id, user_id, termsofuse_id, signed
            FROM user_termsofuse
            WHERE user_id = $1
            ORDER BY signed DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        let entity = SignedTermsOfUseEntity::from_row(&find_first(row, "signed terms of use")?)?;
        Ok(mappers::signed_terms_of_use::to_domain(entity))
    }
}
