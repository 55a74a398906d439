//! Passcode repository

use async_trait::async_trait;
use common::DatabaseResult;
use sqlx::{PgConnection, postgres::PgQueryResult};
use tracing::info;
use uuid::Uuid;

use super::{PasscodeRepository, find_first};
use crate::domain::{Passcode, PasscodeCategory, User};
use crate::entities::{EntityRecord, PasscodeEntity};
use crate::mappers;
use crate::unit_of_work::UowHandle;

#[derive(Clone)]
pub struct PgPasscodeRepository {
    uow: UowHandle,
}

impl PgPasscodeRepository {
    pub fn new(uow: UowHandle) -> Self {
        Self { uow }
    }

    async fn find_by_user(&self, user: &User, category: PasscodeCategory) -> DatabaseResult<Passcode> {
        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        let row = sqlx::query(
            r#"
            SELECT id, user_id, category, expiration
            FROM passcode
            WHERE user_id = $1 AND category = $2
            LIMIT 1
            "#,
        )
        .bind(user.id)
        .bind(category.as_str())
        .fetch_optional(conn)
        .await?;

        let entity = PasscodeEntity::from_row(&find_first(row, "passcode")?)?;
        Ok(mappers::passcode::to_domain(entity))
    }

    async fn find_unexpired(&self, id: Uuid, category: PasscodeCategory) -> DatabaseResult<Passcode> {
        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        let row = sqlx::query(
            r#"
            SELECT id, user_id, category, expiration
            FROM passcode
            WHERE id = $1 AND category = $2 AND expiration > NOW()
            "#,
        )
        .bind(id)
        .bind(category.as_str())
        .fetch_optional(conn)
        .await?;

        let entity = PasscodeEntity::from_row(&find_first(row, "passcode")?)?;
        Ok(mappers::passcode::to_domain(entity))
    }
}

async fn fetch_by_id(conn: &mut PgConnection, id: Uuid) -> DatabaseResult<PasscodeEntity> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, category, expiration
        FROM passcode
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(PasscodeEntity::from_row(&find_first(row, "passcode")?)?)
}

pub(crate) async fn insert(
    conn: &mut PgConnection,
    entity: &PasscodeEntity,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO passcode (id, user_id, category, expiration)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(entity.id)
    .bind(entity.user_id)
    .bind(entity.category.as_str())
    .bind(entity.expiration)
    .execute(conn)
    .await?;

    Ok(())
}

pub(crate) async fn update(
    conn: &mut PgConnection,
    entity: &PasscodeEntity,
) -> Result<PgQueryResult, sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE passcode
        SET user_id = $2, category = $3, expiration = $4
        WHERE id = $1
        "#,
    )
    .bind(entity.id)
    .bind(entity.user_id)
    .bind(entity.category.as_str())
    .bind(entity.expiration)
    .execute(conn)
    .await
}

#[async_trait]
impl PasscodeRepository for PgPasscodeRepository {
    async fn add(&self, passcode: &Passcode) -> DatabaseResult<PasscodeEntity> {
        info!("Adding {} passcode for user: {}", passcode.category, passcode.user_id);

        let entity = mappers::passcode::to_entity(passcode);
        let mut state = self.uow.lock().await;
        state.session.add(EntityRecord::Passcode(entity.clone()));
        Ok(entity)
    }

    async fn modify(&self, passcode: &Passcode) -> DatabaseResult<PasscodeEntity> {
        info!("Modifying passcode: {}", passcode.id);

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        let mut entity = fetch_by_id(conn, passcode.id).await?;
        mappers::passcode::map_to_entity(passcode, &mut entity);
        state.db.track(EntityRecord::Passcode(entity.clone()));
        Ok(entity)
    }

    async fn remove(&self, passcode: &Passcode) -> DatabaseResult<PasscodeEntity> {
        info!("Removing passcode: {}", passcode.id);

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        let entity = fetch_by_id(conn, passcode.id).await?;
        state.session.remove(EntityRecord::Passcode(entity.clone()));
        Ok(entity)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Passcode> {
        info!("Finding passcode by ID: {}", id);

        let mut state = self.uow.lock().await;
        let conn = state.db.connection().await?;
        Ok(mappers::passcode::to_domain(fetch_by_id(conn, id).await?))
    }

    async fn find_activation_by_user(&self, user: &User) -> DatabaseResult<Passcode> {
        info!("Finding activation passcode of user: {}", user.id);
        self.find_by_user(user, PasscodeCategory::Activation).await
    }

    async fn find_reset_by_user(&self, user: &User) -> DatabaseResult<Passcode> {
        info!("Finding reset passcode of user: {}", user.id);
        self.find_by_user(user, PasscodeCategory::Reset).await
    }

    async fn find_activation_by_uid_before_exp(&self, id: Uuid) -> DatabaseResult<Passcode> {
        info!("Finding unexpired activation passcode: {}", id);
        self.find_unexpired(id, PasscodeCategory::Activation).await
    }

    async fn find_reset_by_uid_before_exp(&self, id: Uuid) -> DatabaseResult<Passcode> {
        info!("Finding unexpired reset passcode: {}", id);
        self.find_unexpired(id, PasscodeCategory::Reset).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit_of_work::{PasscodeUnitOfWork, PgPasscodeUnitOfWork, UnitOfWork, UserUnitOfWork};
    use chrono::Duration;
    use common::DatabaseError;
    use sqlx::PgPool;

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
    async fn test_expired_passcodes_are_not_found(pool: PgPool) {
        let uow = PgPasscodeUnitOfWork::new(pool, None);
        let user = User::new("Ada", "Lovelace", Some("ada@example.com".into()), false);
        let expired = Passcode::reset(user.id, Duration::minutes(-5));
        let fresh = Passcode::activation(user.id, Duration::hours(24));

        uow.user_repository().add(&user).await.unwrap();
        uow.passcode_repository().add(&expired).await.unwrap();
        uow.passcode_repository().add(&fresh).await.unwrap();
        uow.save().await.unwrap();

        let repository = uow.passcode_repository();
        assert!(matches!(
            repository.find_reset_by_uid_before_exp(expired.id).await,
            Err(DatabaseError::NoEntityFound("passcode"))
        ));
        assert_eq!(
            repository.find_reset_by_user(&user).await.unwrap().id,
            expired.id
        );
        assert_eq!(
            repository
                .find_activation_by_uid_before_exp(fresh.id)
                .await
                .unwrap()
                .id,
            fresh.id
        );
        // A token of the other category never matches
        assert!(repository.find_reset_by_uid_before_exp(fresh.id).await.is_err());
        assert_eq!(
            repository.find_activation_by_user(&user).await.unwrap().id,
            fresh.id
        );
    }
}
