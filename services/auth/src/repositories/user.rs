//! User repository for database operations

use async_trait::async_trait;
use common::DatabaseResult;
use sqlx::{PgConnection, postgres::PgQueryResult};
use tracing::info;
use uuid::Uuid;

use super::{UserRepository, find_first};
use crate::domain::User;
use crate::entities::{EntityRecord, UserEntity};
use crate::mappers;
use crate::unit_of_work::UowHandle;

/// User repository
#[derive(Clone)]
pub struct PgUserRepository {
    uow: UowHandle,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(uow: UowHandle) -> Self {
        Self { uow }
    }
}

async fn fetch_by_id(conn: &mut PgConnection, id: Uuid) -> DatabaseResult<UserEntity> {
    let row = sqlx::query(
        r#"
        SELECT id, first_name, last_name, email, password, is_active, created
        FROM "user"
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(UserEntity::from_row(&find_first(row, "user")?)?)
}

pub(crate) async fn insert(
    conn: &mut PgConnection,
    entity: &UserEntity,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO "user" (id, first_name, last_name, email, password, is_active, created)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(entity.id)
    .bind(&entity.first_name)
    .bind(&entity.last_name)
    .bind(&entity.email)
    .bind(&entity.password)
    .bind(entity.is_active)
    .bind(entity.created)
    .execute(conn)
    .await?;

    Ok(())
}

pub(crate) async fn update(
    conn: &mut PgConnection,
    entity: &UserEntity,
) -> Result<PgQueryResult, sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE "user"
        SET first_name = $2, last_name = $3, email = $4, password = $5,
            is_active = $6, created = $7
        WHERE id = $1
        "#,
    )
    .bind(entity.id)
    .bind(&entity.first_name)
    .bind(&entity.last_name)
    .bind(&entity.email)
    .bind(&entity.password)
    .bind(entity.is_active)
    .bind(entity.created)
    .execute(conn)
    .await
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn add(&self, user: &User) -> DatabaseResult<UserEntity> {
        info!("Adding user: {}", user.id);

        let entity = mappers::user::to_entity(user);
        let mut state = self.uow.lock().await;
        state.session.add(EntityRecord::User(entity.clone()));
        Ok(entity)
    }

    async fn modify(&self, user: &User) -> DatabaseResult<UserEntity> {
        info!("Modifying user: {}", user.id);

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        let mut entity = fetch_by_id(conn, user.id).await?;
        mappers::user::map_to_entity(user, &mut entity);
        state.db.track(EntityRecord::User(entity.clone()));
        Ok(entity)
    }

    async fn remove(&self, user: &User) -> DatabaseResult<UserEntity> {
        info!("Removing user: {}", user.id);

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        let entity = fetch_by_id(conn, user.id).await?;
        state.session.remove(EntityRecord::User(entity.clone()));
        Ok(entity)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<User> {
        info!("Finding user by ID: {}", id);

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        Ok(mappers::user::to_domain(fetch_by_id(conn, id).await?))
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<User> {
        info!("Finding user by email: {}", email);

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        let row = sqlx::query(
            r#"
            SELECT id, first_name, last_name, email, password, is_active, created
            FROM "user"
            WHERE email = $1
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(conn)
        .await?;

        let entity = UserEntity::from_row(&find_first(row, "user")?)?;
        Ok(mappers::user::to_domain(entity))
    }
}
