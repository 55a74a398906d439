//! Terms of use versions and user agreements

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A published version; the most recent `created` is the one in force
#[derive(Debug, Clone, PartialEq)]
pub struct TermsOfUse {
    pub id: Uuid,
    pub created: DateTime<Utc>,
}

impl TermsOfUse {
    pub fn new(created: DateTime<Utc>) -> Self {
        TermsOfUse {
            id: Uuid::new_v4(),
            created,
        }
    }
}

/// A user's agreement to one version
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTermsOfUse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub termsofuse_id: Uuid,
    pub signed: DateTime<Utc>,
}

impl SignedTermsOfUse {
    pub fn new(user_id: Uuid, termsofuse_id: Uuid, signed: DateTime<Utc>) -> Self {
        SignedTermsOfUse {
            id: Uuid::new_v4(),
            user_id,
            termsofuse_id,
            signed,
        }
    }
}
