use tracing::info;

use super::MapNotFound;
use crate::domain::{OAuth, OAuthProvider, SignedTermsOfUse, User};
use crate::error::ServiceError;
use crate::oauth::{OAuthClient, OAuthProfile};
use crate::unit_of_work::OAuthUnitOfWork;

const MAX_NAME_LENGTH: usize = 50;

fn truncate(name: &str) -> String {
    name.chars().take(MAX_NAME_LENGTH).collect()
}

/// Sign-in through an OAuth provider, opening the account on first use
pub struct OAuthLoginService<'a, U> {
    unit_of_work: U,
    client: &'a dyn OAuthClient,
}

impl<'a, U: OAuthUnitOfWork> OAuthLoginService<'a, U> {
    pub fn new(unit_of_work: U, client: &'a dyn OAuthClient) -> Self {
        Self {
            unit_of_work,
            client,
        }
    }

    /// Exchange an authorization code and sign in its owner
    pub async fn login(&self, code: &str, pkce_verifier: &str) -> Result<User, ServiceError> {
        let profile = self
            .client
            .exchange_code_for_profile(code, pkce_verifier)
            .await?;
        self.login_with_profile(self.client.provider(), &profile).await
    }

    pub async fn login_with_profile(
        &self,
        provider: OAuthProvider,
        profile: &OAuthProfile,
    ) -> Result<User, ServiceError> {
        info!("{} login for: {}", provider, profile.provider_user_id);

        let users = self.unit_of_work.user_repository();
        let links = self.unit_of_work.oauth_repository();

        if let Some(link) = links
            .find_by_provider_by_uid(provider, &profile.provider_user_id)
            .await
            .optional()?
        {
            return users
                .find_by_id(link.user_id)
                .await
                .map_not_found(ServiceError::UserAccountNotFound);
        }

        info!("First {} login, creating account", provider);
        let user = User::new(
            truncate(&profile.first_name),
            truncate(&profile.last_name),
            None,
            true,
        );
        let terms = self
            .unit_of_work
            .terms_of_use_repository()
            .find_latest_version()
            .await?;
        let agreement = SignedTermsOfUse::new(user.id, terms.id, user.created);
        let link = OAuth::new(user.id, provider, profile.provider_user_id.clone());

        users.add(&user).await?;
        self.unit_of_work.flush().await?;
        self.unit_of_work
            .signed_terms_of_use_repository()
            .add(&agreement)
            .await?;
        links.add(&link).await?;
        self.unit_of_work.save().await?;

        Ok(user)
    }
}
