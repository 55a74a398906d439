//! Terms of use compliance
//!
//! A user is compliant when the agreement they signed most recently is for
//! the latest published version of the terms.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::MapNotFound;
use crate::domain::SignedTermsOfUse;
use crate::error::ServiceError;
use crate::unit_of_work::TermsOfUseUnitOfWork;

async fn is_compliant<U: TermsOfUseUnitOfWork>(
    unit_of_work: &U,
    user_id: Uuid,
) -> Result<(bool, Uuid), ServiceError> {
    let latest = unit_of_work
        .terms_of_use_repository()
        .find_latest_version()
        .await?;
    let signed = unit_of_work
        .signed_terms_of_use_repository()
        .find_latest_compliant_term_per_user(user_id)
        .await
        .optional()?;

    let compliant = signed.is_some_and(|agreement| agreement.termsofuse_id == latest.id);
    Ok((compliant, latest.id))
}

pub struct UserComplianceService<U> {
    unit_of_work: U,
}

impl<U: TermsOfUseUnitOfWork> UserComplianceService<U> {
    pub fn new(unit_of_work: U) -> Self {
        Self { unit_of_work }
    }

    /// Sign the latest terms on behalf of the user unless already done
    pub async fn make_user_compliant(&self, user_id: Uuid) -> Result<(), ServiceError> {
        let (compliant, latest_id) = is_compliant(&self.unit_of_work, user_id).await?;
        if compliant {
            return Ok(());
        }

        info!("User {} accepts terms of use {}", user_id, latest_id);
        let agreement = SignedTermsOfUse::new(user_id, latest_id, Utc::now());
        self.unit_of_work
            .signed_terms_of_use_repository()
            .add(&agreement)
            .await?;
        self.unit_of_work.save().await?;
        Ok(())
    }
}

pub struct UserCompliancePermissionService<U> {
    unit_of_work: U,
}

impl<U: TermsOfUseUnitOfWork> UserCompliancePermissionService<U> {
    pub fn new(unit_of_work: U) -> Self {
        Self { unit_of_work }
    }

    pub async fn is_user_compliant(&self, user_id: Uuid) -> Result<bool, ServiceError> {
        Ok(is_compliant(&self.unit_of_work, user_id).await?.0)
    }
}
