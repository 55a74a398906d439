//! Unit of work: one session and one transaction shared by several
//! repositories
//!
//! Repositories queue changes in the [`Session`]. `flush` writes them inside
//! the open transaction, `save` writes them and commits. Any failure rolls
//! the transaction back; the next repository call then begins a new one.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::entities::EntityRecord;
use crate::error::DbError;
use crate::repositories::{
    self, OAuthRepository, PasscodeRepository, PgOAuthRepository, PgPasscodeRepository,
    PgSignedTermsOfUseRepository, PgTermsOfUseRepository, PgUserRepository,
    SignedTermsOfUseRepository, TermsOfUseRepository, UserRepository,
};
use crate::session::{Intent, Session};

#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Write queued changes without committing
    async fn flush(&self) -> Result<(), DbError>;

    /// Write queued changes and commit
    async fn save(&self) -> Result<(), DbError>;
}

pub trait UserUnitOfWork: UnitOfWork {
    fn user_repository(&self) -> &dyn UserRepository;
}

pub trait TermsOfUseUnitOfWork: UnitOfWork {
    fn terms_of_use_repository(&self) -> &dyn TermsOfUseRepository;
    fn signed_terms_of_use_repository(&self) -> &dyn SignedTermsOfUseRepository;
}

pub trait PasscodeUnitOfWork: UserUnitOfWork + TermsOfUseUnitOfWork {
    fn passcode_repository(&self) -> &dyn PasscodeRepository;
}

pub trait OAuthUnitOfWork: UserUnitOfWork + TermsOfUseUnitOfWork {
    fn oauth_repository(&self) -> &dyn OAuthRepository;
}

/// Database side of a unit of work
pub struct DbSession {
    pool: PgPool,
    tx: Option<Transaction<'static, Postgres>>,
    tracked: Vec<EntityRecord>,
}

impl DbSession {
    fn new(pool: PgPool) -> Self {
        Self {
            pool,
            tx: None,
            tracked: Vec::new(),
        }
    }

    /// Connection of the open transaction, beginning one if needed
    pub async fn connection(&mut self) -> Result<&mut PgConnection, sqlx::Error> {
        let tx = match self.tx.take() {
            Some(tx) => tx,
            None => self.pool.begin().await?,
        };
        Ok(&mut **self.tx.insert(tx))
    }

    /// Remember a loaded record whose fields were overwritten
    pub fn track(&mut self, record: EntityRecord) {
        self.tracked.push(record);
    }

    async fn write_pending(&mut self, intents: Vec<Intent>) -> Result<(), DbError> {
        let tracked = std::mem::take(&mut self.tracked);
        if intents.is_empty() && tracked.is_empty() {
            return Ok(());
        }

        info!(
            "Writing {} queued and {} modified records",
            intents.len(),
            tracked.len()
        );

        let result = match self.connection().await {
            Ok(conn) => write(conn, intents, tracked).await,
            Err(e) => Err(DbError::Flush(e)),
        };

        if result.is_err() {
            self.rollback().await;
        }
        result
    }

    async fn commit(&mut self) -> Result<(), DbError> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await.map_err(DbError::Commit)?;
        }
        Ok(())
    }

    async fn rollback(&mut self) {
        self.tracked.clear();
        if let Some(tx) = self.tx.take() {
            if let Err(e) = tx.rollback().await {
                warn!("Failed to roll back transaction: {}", e);
            }
        }
    }
}

async fn write(
    conn: &mut PgConnection,
    intents: Vec<Intent>,
    tracked: Vec<EntityRecord>,
) -> Result<(), DbError> {
    for intent in intents {
        match intent {
            Intent::Add(record) => insert(conn, &record).await.map_err(DbError::Add)?,
            Intent::Remove(record) => delete(conn, &record).await.map_err(DbError::Remove)?,
        }
    }

    for record in tracked {
        update(conn, &record).await.map_err(DbError::Flush)?;
    }

    Ok(())
}

async fn insert(conn: &mut PgConnection, record: &EntityRecord) -> Result<(), sqlx::Error> {
    match record {
        EntityRecord::User(entity) => repositories::user::insert(conn, entity).await,
        EntityRecord::Passcode(entity) => repositories::passcode::insert(conn, entity).await,
        EntityRecord::OAuth(entity) => repositories::oauth::insert(conn, entity).await,
        EntityRecord::TermsOfUse(entity) => {
            repositories::terms_of_use::insert_terms(conn, entity).await
        }
        EntityRecord::SignedTermsOfUse(entity) => {
            repositories::terms_of_use::insert_signed(conn, entity).await
        }
    }
}

async fn update(conn: &mut PgConnection, record: &EntityRecord) -> Result<(), sqlx::Error> {
    let result = match record {
        EntityRecord::User(entity) => repositories::user::update(conn, entity).await?,
        EntityRecord::Passcode(entity) => repositories::passcode::update(conn, entity).await?,
        EntityRecord::OAuth(entity) => repositories::oauth::update(conn, entity).await?,
        EntityRecord::TermsOfUse(entity) => {
            repositories::terms_of_use::update_terms(conn, entity).await?
        }
        EntityRecord::SignedTermsOfUse(entity) => {
            repositories::terms_of_use::update_signed(conn, entity).await?
        }
    };

    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}

async fn delete(conn: &mut PgConnection, record: &EntityRecord) -> Result<(), sqlx::Error> {
    let sql = format!(r#"DELETE FROM "{}" WHERE id = $1"#, record.table());
    let result = sqlx::query(&sql).bind(record.id()).execute(conn).await?;

    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}

/// Session and transaction guarded together
pub struct UowState {
    pub session: Session,
    pub db: DbSession,
}

/// Shared handle given to every repository of one unit of work
#[derive(Clone)]
pub struct UowHandle(Arc<Mutex<UowState>>);

impl UowHandle {
    /// A handle with its own session unless one is supplied
    pub fn new(pool: PgPool, session: Option<Session>) -> Self {
        UowHandle(Arc::new(Mutex::new(UowState {
            session: session.unwrap_or_default(),
            db: DbSession::new(pool),
        })))
    }

    pub async fn lock(&self) -> MutexGuard<'_, UowState> {
        self.0.lock().await
    }

    pub async fn flush(&self) -> Result<(), DbError> {
        let mut state = self.lock().await;
        let intents = state.session.drain();
        state.db.write_pending(intents).await
    }

    pub async fn save(&self) -> Result<(), DbError> {
        let mut state = self.lock().await;
        let intents = state.session.drain();
        state.db.write_pending(intents).await?;
        state.db.commit().await
    }
}

/// Unit of work exposing only the user repository
pub struct PgUserUnitOfWork {
    uow: UowHandle,
    users: PgUserRepository,
}

impl PgUserUnitOfWork {
    pub fn new(pool: PgPool, session: Option<Session>) -> Self {
        let uow = UowHandle::new(pool, session);
        Self {
            users: PgUserRepository::new(uow.clone()),
            uow,
        }
    }
}

#[async_trait]
impl UnitOfWork for PgUserUnitOfWork {
    async fn flush(&self) -> Result<(), DbError> {
        self.uow.flush().await
    }

    async fn save(&self) -> Result<(), DbError> {
        self.uow.save().await
    }
}

impl UserUnitOfWork for PgUserUnitOfWork {
    fn user_repository(&self) -> &dyn UserRepository {
        &self.users
    }
}

/// Unit of work over terms of use versions and agreements
pub struct PgTermsOfUseUnitOfWork {
    uow: UowHandle,
    terms: PgTermsOfUseRepository,
    signed_terms: PgSignedTermsOfUseRepository,
}

impl PgTermsOfUseUnitOfWork {
    pub fn new(pool: PgPool, session: Option<Session>) -> Self {
        let uow = UowHandle::new(pool, session);
        Self {
            terms: PgTermsOfUseRepository::new(uow.clone()),
            signed_terms: PgSignedTermsOfUseRepository::new(uow.clone()),
            uow,
        }
    }
}

#[async_trait]
impl UnitOfWork for PgTermsOfUseUnitOfWork {
    async fn flush(&self) -> Result<(), DbError> {
        self.uow.flush().await
    }

    async fn save(&self) -> Result<(), DbError> {
        self.uow.save().await
    }
}

impl TermsOfUseUnitOfWork for PgTermsOfUseUnitOfWork {
    fn terms_of_use_repository(&self) -> &dyn TermsOfUseRepository {
        &self.terms
    }

    fn signed_terms_of_use_repository(&self) -> &dyn SignedTermsOfUseRepository {
        &self.signed_terms
    }
}

/// Unit of work for registration, activation and password resets
pub struct PgPasscodeUnitOfWork {
    uow: UowHandle,
    passcodes: PgPasscodeRepository,
    users: PgUserRepository,
    terms: PgTermsOfUseRepository,
    signed_terms: PgSignedTermsOfUseRepository,
}

impl PgPasscodeUnitOfWork {
    pub fn new(pool: PgPool, session: Option<Session>) -> Self {
        let uow = UowHandle::new(pool, session);
        Self {
            passcodes: PgPasscodeRepository::new(uow.clone()),
            users: PgUserRepository::new(uow.clone()),
            terms: PgTermsOfUseRepository::new(uow.clone()),
            signed_terms: PgSignedTermsOfUseRepository::new(uow.clone()),
            uow,
        }
    }
}

#[async_trait]
impl UnitOfWork for PgPasscodeUnitOfWork {
    async fn flush(&self) -> Result<(), DbError> {
        self.uow.flush().await
    }

    async fn save(&self) -> Result<(), DbError> {
        self.uow.save().await
    }
}

impl UserUnitOfWork for PgPasscodeUnitOfWork {
    fn user_repository(&self) -> &dyn UserRepository {
        &self.users
    }
}

impl TermsOfUseUnitOfWork for PgPasscodeUnitOfWork {
    fn terms_of_use_repository(&self) -> &dyn TermsOfUseRepository {
        &self.terms
    }

    fn signed_terms_of_use_repository(&self) -> &dyn SignedTermsOfUseRepository {
        &self.signed_terms
    }
}

impl PasscodeUnitOfWork for PgPasscodeUnitOfWork {
    fn passcode_repository(&self) -> &dyn PasscodeRepository {
        &self.passcodes
    }
}

/// Unit of work for OAuth sign-in
pub struct PgOAuthUnitOfWork {
    uow: UowHandle,
    oauth: PgOAuthRepository,
    users: PgUserRepository,
    terms: PgTermsOfUseRepository,
    signed_terms: PgSignedTermsOfUseRepository,
}

impl PgOAuthUnitOfWork {
    pub fn new(pool: PgPool, session: Option<Session>) -> Self {
        let uow = UowHandle::new(pool, session);
        Self {
            oauth: PgOAuthRepository::new(uow.clone()),
            users: PgUserRepository::new(uow.clone()),
            terms: PgTermsOfUseRepository::new(uow.clone()),
            signed_terms: PgSignedTermsOfUseRepository::new(uow.clone()),
            uow,
        }
    }
}

#[async_trait]
impl UnitOfWork for PgOAuthUnitOfWork {
    async fn flush(&self) -> Result<(), DbError> {
        self.uow.flush().await
    }

    async fn save(&self) -> Result<(), DbError> {
        self.uow.save().await
    }
}

impl UserUnitOfWork for PgOAuthUnitOfWork {
    fn user_repository(&self) -> &dyn UserRepository {
        &self.users
    }
}

impl TermsOfUseUnitOfWork for PgOAuthUnitOfWork {
    fn terms_of_use_repository(&self) -> &dyn TermsOfUseRepository {
        &self.terms
    }

    fn signed_terms_of_use_repository(&self) -> &dyn SignedTermsOfUseRepository {
        &self.signed_terms
    }
}

impl OAuthUnitOfWork for PgOAuthUnitOfWork {
    fn oauth_repository(&self) -> &dyn OAuthRepository {
        &self.oauth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Passcode, User};
    use chrono::Duration;
    use common::DatabaseError;

    async fn stored_user(pool: &PgPool) -> User {
        let uow = PgUserUnitOfWork::new(pool.clone(), None);
        let user = User::new("Ada", "Lovelace", Some("ada@example.com".into()), false);
        uow.user_repository().add(&user).await.unwrap();
        uow.save().await.unwrap();
        user
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
    async fn test_nothing_is_written_before_save(pool: PgPool) {
        let uow = PgUserUnitOfWork::new(pool.clone(), None);
        let user = User::new("Ada", "Lovelace", Some("ada@example.com".into()), false);
        uow.user_repository().add(&user).await.unwrap();

        let other = PgUserUnitOfWork::new(pool.clone(), None);
        assert!(matches!(
            other.user_repository().find_by_id(user.id).await,
            Err(DatabaseError::NoEntityFound(_))
        ));

        uow.save().await.unwrap();
        let found = other.user_repository().find_by_id(user.id).await.unwrap();
        assert_eq!(found.email.as_deref(), Some("ada@example.com"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
    async fn test_flush_is_visible_inside_the_transaction_only(pool: PgPool) {
        let uow = PgUserUnitOfWork::new(pool.clone(), None);
        let user = User::new("Ada", "Lovelace", Some("ada@example.com".into()), false);
        uow.user_repository().add(&user).await.unwrap();
        uow.flush().await.unwrap();

        assert!(uow.user_repository().find_by_id(user.id).await.is_ok());

        let other = PgUserUnitOfWork::new(pool.clone(), None);
        assert!(other.user_repository().find_by_id(user.id).await.is_err());
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
    async fn test_modify_is_written_on_save(pool: PgPool) {
        let mut user = stored_user(&pool).await;

        let uow = PgUserUnitOfWork::new(pool.clone(), None);
        user.set_active();
        user.first_name = "Augusta".to_string();
        uow.user_repository().modify(&user).await.unwrap();
        uow.save().await.unwrap();

        let found = uow.user_repository().find_by_id(user.id).await.unwrap();
        assert!(found.is_active);
        assert_eq!(found.first_name, "Augusta");
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
    async fn test_duplicate_passcode_rolls_back_everything(pool: PgPool) {
        let user = stored_user(&pool).await;

        let uow = PgPasscodeUnitOfWork::new(pool.clone(), None);
        let mut renamed = user.clone();
        renamed.first_name = "Augusta".to_string();
        uow.user_repository().modify(&renamed).await.unwrap();
        uow.passcode_repository()
            .add(&Passcode::activation(user.id, Duration::hours(24)))
            .await
            .unwrap();
        uow.passcode_repository()
            .add(&Passcode::activation(user.id, Duration::hours(24)))
            .await
            .unwrap();

        let result = uow.save().await;
        assert!(matches!(result, Err(DbError::Add(_))));

        let found = uow.user_repository().find_by_id(user.id).await.unwrap();
        assert_eq!(found.first_name, "Ada");
        assert!(
            uow.passcode_repository()
                .find_activation_by_user(&user)
                .await
                .is_err()
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
    async fn test_remove_cascades_to_passcodes(pool: PgPool) {
        let user = stored_user(&pool).await;

        let uow = PgPasscodeUnitOfWork::new(pool.clone(), None);
        let passcode = Passcode::reset(user.id, Duration::minutes(15));
        uow.passcode_repository().add(&passcode).await.unwrap();
        uow.save().await.unwrap();

        uow.user_repository().remove(&user).await.unwrap();
        uow.save().await.unwrap();

        assert!(uow.passcode_repository().find_by_id(passcode.id).await.is_err());
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
    async fn test_supplied_session_is_replayed(pool: PgPool) {
        let user = User::new("Ada", "Lovelace", None, true);
        let mut session = Session::new();
        session.add(EntityRecord::User(crate::mappers::user::to_entity(&user)));

        let uow = PgUserUnitOfWork::new(pool.clone(), Some(session));
        uow.save().await.unwrap();

        assert!(uow.user_repository().find_by_id(user.id).await.is_ok());
    }
}
