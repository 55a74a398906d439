//! In-memory collaborators for service and route tests

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use common::{DatabaseError, DatabaseResult};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domain::{
    OAuth, OAuthProvider, Passcode, PasscodeCategory, SignedTermsOfUse, TermsOfUse, User,
};
use crate::email::{Email, EmailError, EmailSender};
use crate::entities::{
    OAuthEntity, PasscodeEntity, SignedTermsOfUseEntity, TermsOfUseEntity, UserEntity,
};
use crate::error::DbError;
use crate::mappers;
use crate::oauth::{AuthorizationRequest, OAuthClient, OAuthError, OAuthProfile};
use crate::password::{PasswordError, PasswordHasher};
use crate::repositories::{
    OAuthRepository, PasscodeRepository, SignedTermsOfUseRepository, TermsOfUseRepository,
    UserRepository,
};
use crate::unit_of_work::{
    OAuthUnitOfWork, PasscodeUnitOfWork, TermsOfUseUnitOfWork, UnitOfWork, UserUnitOfWork,
};

/// Reversible "hash" that is never equal to the plaintext
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        Ok(format!("hashed:{}", plaintext))
    }

    fn verify(&self, hash: &str, plaintext: &str) -> bool {
        hash.strip_prefix("hashed:") == Some(plaintext)
    }
}

/// Records every email instead of sending it
#[derive(Default)]
pub struct RecordingEmailSender {
    pub sent: Mutex<Vec<Email>>,
}

impl RecordingEmailSender {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    fn sender(&self) -> &str {
        "no-reply@livedisplaced.com"
    }

    async fn send(&self, email: &Email) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Provider returning a fixed profile for any code
pub struct StaticOAuthClient {
    pub provider: OAuthProvider,
    pub profile: OAuthProfile,
}

#[async_trait]
impl OAuthClient for StaticOAuthClient {
    fn provider(&self) -> OAuthProvider {
        self.provider
    }

    fn authorization_url(&self) -> AuthorizationRequest {
        AuthorizationRequest {
            url: format!("https://provider.test/authorize?state=state-{}", self.provider),
            csrf_state: format!("state-{}", self.provider),
            pkce_verifier: "verifier".to_string(),
        }
    }

    async fn exchange_code_for_profile(
        &self,
        code: &str,
        _pkce_verifier: &str,
    ) -> Result<OAuthProfile, OAuthError> {
        if code == "bad-code" {
            return Err(OAuthError::Exchange("invalid_grant".to_string()));
        }
        Ok(self.profile.clone())
    }
}

/// Committed rows
#[derive(Debug, Default, Clone)]
pub struct FakeStore {
    pub users: Vec<User>,
    pub passcodes: Vec<Passcode>,
    pub oauth: Vec<OAuth>,
    pub terms: Vec<TermsOfUse>,
    pub signed_terms: Vec<SignedTermsOfUse>,
    pub saves: usize,
}

impl FakeStore {
    /// A store holding the first published terms of use
    pub fn with_terms() -> Self {
        FakeStore {
            terms: vec![TermsOfUse::new(
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            )],
            ..Default::default()
        }
    }

    pub fn latest_terms(&self) -> &TermsOfUse {
        self.terms.iter().max_by_key(|terms| terms.created).unwrap()
    }
}

#[derive(Debug, Clone)]
enum Change {
    AddUser(User),
    SetUser(User),
    RemoveUser(Uuid),
    AddPasscode(Passcode),
    SetPasscode(Passcode),
    RemovePasscode(Uuid),
    AddOAuth(OAuth),
    SetOAuth(OAuth),
    RemoveOAuth(Uuid),
    AddTerms(TermsOfUse),
    SetTerms(TermsOfUse),
    RemoveTerms(Uuid),
    AddSigned(SignedTermsOfUse),
    SetSigned(SignedTermsOfUse),
    RemoveSigned(Uuid),
}

fn replace<T: Clone>(rows: &mut [T], row: &T, same: impl Fn(&T) -> bool) {
    if let Some(slot) = rows.iter_mut().find(|existing| same(existing)) {
        *slot = row.clone();
    }
}

impl Change {
    fn apply(self, store: &mut FakeStore) {
        match self {
            Change::AddUser(user) => store.users.push(user),
            Change::SetUser(user) => replace(&mut store.users, &user, |u| u.id == user.id),
            Change::RemoveUser(id) => {
                store.users.retain(|u| u.id != id);
                store.passcodes.retain(|p| p.user_id != id);
                store.oauth.retain(|o| o.user_id != id);
                store.signed_terms.retain(|s| s.user_id != id);
            }
            Change::AddPasscode(passcode) => store.passcodes.push(passcode),
            Change::SetPasscode(passcode) => {
                replace(&mut store.passcodes, &passcode, |p| p.id == passcode.id)
            }
            Change::RemovePasscode(id) => store.passcodes.retain(|p| p.id != id),
            Change::AddOAuth(oauth) => store.oauth.push(oauth),
            Change::SetOAuth(oauth) => replace(&mut store.oauth, &oauth, |o| o.id == oauth.id),
            Change::RemoveOAuth(id) => store.oauth.retain(|o| o.id != id),
            Change::AddTerms(terms) => store.terms.push(terms),
            Change::SetTerms(terms) => replace(&mut store.terms, &terms, |t| t.id == terms.id),
            Change::RemoveTerms(id) => store.terms.retain(|t| t.id != id),
            Change::AddSigned(signed) => store.signed_terms.push(signed),
            Change::SetSigned(signed) => {
                replace(&mut store.signed_terms, &signed, |s| s.id == signed.id)
            }
            Change::RemoveSigned(id) => store.signed_terms.retain(|s| s.id != id),
        }
    }
}

#[derive(Debug, Default)]
struct FakeState {
    store: FakeStore,
    /// State as of the last successful save, restored on rollback
    committed: FakeStore,
    pending: Vec<Change>,
    fail_on_save: bool,
}

/// Unit of work over an in-memory store
///
/// Changes become visible to finders on flush and count as saved on save.
/// A failing save rolls back everything flushed since the last save.
/// Clones share the same store.
#[derive(Clone, Default)]
pub struct FakeUnitOfWork {
    state: Arc<Mutex<FakeState>>,
}

impl FakeUnitOfWork {
    pub fn new(store: FakeStore) -> Self {
        FakeUnitOfWork {
            state: Arc::new(Mutex::new(FakeState {
                committed: store.clone(),
                store,
                ..Default::default()
            })),
        }
    }

    /// Make every following `save` fail
    pub fn fail_on_save(&self) {
        self.state.lock().unwrap().fail_on_save = true;
    }

    /// Snapshot of the rows written so far
    pub fn store(&self) -> FakeStore {
        self.state.lock().unwrap().store.clone()
    }

    fn queue(&self, change: Change) {
        self.state.lock().unwrap().pending.push(change);
    }

    fn find<T: Clone>(
        &self,
        entity: &'static str,
        select: impl Fn(&FakeStore) -> Option<&T>,
    ) -> DatabaseResult<T> {
        let state = self.state.lock().unwrap();
        select(&state.store)
            .cloned()
            .ok_or(DatabaseError::NoEntityFound(entity))
    }
}

#[async_trait]
impl UnitOfWork for FakeUnitOfWork {
    async fn flush(&self) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        let pending = std::mem::take(&mut state.pending);
        for change in pending {
            change.apply(&mut state.store);
        }
        Ok(())
    }

    async fn save(&self) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_on_save {
            state.pending.clear();
            state.store = state.committed.clone();
            return Err(DbError::Commit(sqlx::Error::PoolClosed));
        }
        let pending = std::mem::take(&mut state.pending);
        for change in pending {
            change.apply(&mut state.store);
        }
        state.store.saves += 1;
        state.committed = state.store.clone();
        Ok(())
    }
}

#[async_trait]
impl UserRepository for FakeUnitOfWork {
    async fn add(&self, user: &User) -> DatabaseResult<UserEntity> {
        self.queue(Change::AddUser(user.clone()));
        Ok(mappers::user::to_entity(user))
    }

    async fn modify(&self, user: &User) -> DatabaseResult<UserEntity> {
        UserRepository::find_by_id(self, user.id).await?;
        self.queue(Change::SetUser(user.clone()));
        Ok(mappers::user::to_entity(user))
    }

    async fn remove(&self, user: &User) -> DatabaseResult<UserEntity> {
        let stored = UserRepository::find_by_id(self, user.id).await?;
        self.queue(Change::RemoveUser(user.id));
        Ok(mappers::user::to_entity(&stored))
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<User> {
        self.find("user", |store| store.users.iter().find(|u| u.id == id))
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<User> {
        self.find("user", |store| {
            store
                .users
                .iter()
                .find(|u| u.email.as_deref() == Some(email))
        })
    }
}

#[async_trait]
impl PasscodeRepository for FakeUnitOfWork {
    async fn add(&self, passcode: &Passcode) -> DatabaseResult<PasscodeEntity> {
        self.queue(Change::AddPasscode(passcode.clone()));
        Ok(mappers::passcode::to_entity(passcode))
    }

    async fn modify(&self, passcode: &Passcode) -> DatabaseResult<PasscodeEntity> {
        PasscodeRepository::find_by_id(self, passcode.id).await?;
        self.queue(Change::SetPasscode(passcode.clone()));
        Ok(mappers::passcode::to_entity(passcode))
    }

    async fn remove(&self, passcode: &Passcode) -> DatabaseResult<PasscodeEntity> {
        let stored = PasscodeRepository::find_by_id(self, passcode.id).await?;
        self.queue(Change::RemovePasscode(passcode.id));
        Ok(mappers::passcode::to_entity(&stored))
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Passcode> {
        self.find("passcode", |store| store.passcodes.iter().find(|p| p.id == id))
    }

    async fn find_activation_by_user(&self, user: &User) -> DatabaseResult<Passcode> {
        self.find("passcode", |store| {
            store
                .passcodes
                .iter()
                .find(|p| p.user_id == user.id && p.category == PasscodeCategory::Activation)
        })
    }

    async fn find_reset_by_user(&self, user: &User) -> DatabaseResult<Passcode> {
        self.find("passcode", |store| {
            store
                .passcodes
                .iter()
                .find(|p| p.user_id == user.id && p.category == PasscodeCategory::Reset)
        })
    }

    async fn find_activation_by_uid_before_exp(&self, id: Uuid) -> DatabaseResult<Passcode> {
        self.find("passcode", |store| {
            store.passcodes.iter().find(|p| {
                p.id == id && p.category == PasscodeCategory::Activation && !p.is_expired()
            })
        })
    }

    async fn find_reset_by_uid_before_exp(&self, id: Uuid) -> DatabaseResult<Passcode> {
        self.find("passcode", |store| {
            store.passcodes.iter().find(|p| {
                p.id == id && p.category == PasscodeCategory::Reset && !p.is_expired()
            })
        })
    }
}

#[async_trait]
impl OAuthRepository for FakeUnitOfWork {
    async fn add(&self, oauth: &OAuth) -> DatabaseResult<OAuthEntity> {
        self.queue(Change::AddOAuth(oauth.clone()));
        Ok(mappers::oauth::to_entity(oauth))
    }

    async fn modify(&self, oauth: &OAuth) -> DatabaseResult<OAuthEntity> {
        OAuthRepository::find_by_id(self, oauth.id).await?;
        self.queue(Change::SetOAuth(oauth.clone()));
        Ok(mappers::oauth::to_entity(oauth))
    }

    async fn remove(&self, oauth: &OAuth) -> DatabaseResult<OAuthEntity> {
        let stored = OAuthRepository::find_by_id(self, oauth.id).await?;
        self.queue(Change::RemoveOAuth(oauth.id));
        Ok(mappers::oauth::to_entity(&stored))
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<OAuth> {
        self.find("oauth", |store| store.oauth.iter().find(|o| o.id == id))
    }

    async fn find_by_provider_by_uid(
        &self,
        provider: OAuthProvider,
        provider_user_id: &str,
    ) -> DatabaseResult<OAuth> {
        self.find("oauth", |store| {
            store
                .oauth
                .iter()
                .find(|o| o.provider == provider && o.provider_user_id == provider_user_id)
        })
    }
}

#[async_trait]
impl TermsOfUseRepository for FakeUnitOfWork {
    async fn add(&self, terms: &TermsOfUse) -> DatabaseResult<TermsOfUseEntity> {
        self.queue(Change::AddTerms(terms.clone()));
        Ok(mappers::terms_of_use::to_entity(terms))
    }

    async fn modify(&self, terms: &TermsOfUse) -> DatabaseResult<TermsOfUseEntity> {
        TermsOfUseRepository::find_by_id(self, terms.id).await?;
        self.queue(Change::SetTerms(terms.clone()));
        Ok(mappers::terms_of_use::to_entity(terms))
    }

    async fn remove(&self, terms: &TermsOfUse) -> DatabaseResult<TermsOfUseEntity> {
        let stored = TermsOfUseRepository::find_by_id(self, terms.id).await?;
        self.queue(Change::RemoveTerms(terms.id));
        Ok(mappers::terms_of_use::to_entity(&stored))
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<TermsOfUse> {
        self.find("terms of use", |store| {
            store.terms.iter().find(|t| t.id == id)
        })
    }

    async fn find_latest_version(&self) -> DatabaseResult<TermsOfUse> {
        self.find("terms of use", |store| {
            store.terms.iter().max_by_key(|t| t.created)
        })
    }
}

#[async_trait]
impl SignedTermsOfUseRepository for FakeUnitOfWork {
    async fn add(&self, agreement: &SignedTermsOfUse) -> DatabaseResult<SignedTermsOfUseEntity> {
        self.queue(Change::AddSigned(agreement.clone()));
        Ok(mappers::signed_terms_of_use::to_entity(agreement))
    }

    async fn modify(
        &self,
        agreement: &SignedTermsOfUse,
    ) -> DatabaseResult<SignedTermsOfUseEntity> {
        SignedTermsOfUseRepository::find_by_id(self, agreement.id).await?;
        self.queue(Change::SetSigned(agreement.clone()));
        Ok(mappers::signed_terms_of_use::to_entity(agreement))
    }

    async fn remove(
        &self,
        agreement: &SignedTermsOfUse,
    ) -> DatabaseResult<SignedTermsOfUseEntity> {
        let stored = SignedTermsOfUseRepository::find_by_id(self, agreement.id).await?;
        self.queue(Change::RemoveSigned(agreement.id));
        Ok(mappers::signed_terms_of_use::to_entity(&stored))
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<SignedTermsOfUse> {
        self.find("signed terms of use", |store| {
            store.signed_terms.iter().find(|s| s.id == id)
        })
    }

    async fn find_latest_compliant_term_per_user(
        &self,
        user_id: Uuid,
    ) -> DatabaseResult<SignedTermsOfUse> {
        self.find("signed terms of use", |store| {
            store
                .signed_terms
                .iter()
                .filter(|s| s.user_id == user_id)
                .max_by_key(|s| s.signed)
        })
    }
}

impl UserUnitOfWork for FakeUnitOfWork {
    fn user_repository(&self) -> &dyn UserRepository {
        self
    }
}

impl TermsOfUseUnitOfWork for FakeUnitOfWork {
    fn terms_of_use_repository(&self) -> &dyn TermsOfUseRepository {
        self
    }

    fn signed_terms_of_use_repository(&self) -> &dyn SignedTermsOfUseRepository {
        self
    }
}

impl PasscodeUnitOfWork for FakeUnitOfWork {
    fn passcode_repository(&self) -> &dyn PasscodeRepository {
        self
    }
}

impl OAuthUnitOfWork for FakeUnitOfWork {
    fn oauth_repository(&self) -> &dyn OAuthRepository {
        self
    }
}

/// RSA key pair used to sign tokens in tests
pub const TEST_PRIVATE_KEY: &str = include_str!("../tests/fixtures/jwt_private.pem");
pub const TEST_PUBLIC_KEY: &str = include_str!("../tests/fixtures/jwt_public.pem");
