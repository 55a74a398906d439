//! Conversions between persistence records and domain objects
//!
//! One module per aggregate, each with `to_domain`, `to_entity` and
//! `map_to_entity` (overwrite an already loaded record in place).

pub mod user {
    use crate::domain::User;
    use crate::entities::UserEntity;

    pub fn to_domain(entity: UserEntity) -> User {
        User {
            id: entity.id,
            first_name: entity.first_name,
            last_name: entity.last_name,
            email: entity.email,
            password: entity.password,
            is_active: entity.is_active,
            created: entity.created,
        }
    }

    pub fn to_entity(user: &User) -> UserEntity {
        UserEntity {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            is_active: user.is_active,
            created: user.created,
        }
    }

    pub fn map_to_entity(user: &User, entity: &mut UserEntity) {
        entity.first_name = user.first_name.clone();
        entity.last_name = user.last_name.clone();
        entity.email = user.email.clone();
        entity.password = user.password.clone();
        entity.is_active = user.is_active;
        entity.created = user.created;
    }
}

pub mod passcode {
    use crate::domain::Passcode;
    use crate::entities::PasscodeEntity;

    pub fn to_domain(entity: PasscodeEntity) -> Passcode {
        Passcode {
            id: entity.id,
            user_id: entity.user_id,
            category: entity.category,
            expiration: entity.expiration,
        }
    }

    pub fn to_entity(passcode: &Passcode) -> PasscodeEntity {
        PasscodeEntity {
            id: passcode.id,
            user_id: passcode.user_id,
            category: passcode.category,
            expiration: passcode.expiration,
        }
    }

    pub fn map_to_entity(passcode: &Passcode, entity: &mut PasscodeEntity) {
        entity.user_id = passcode.user_id;
        entity.category = passcode.category;
        entity.expiration = passcode.expiration;
    }
}

pub mod oauth {
    use crate::domain::OAuth;
    use crate::entities::OAuthEntity;

    pub fn to_domain(entity: OAuthEntity) -> OAuth {
        OAuth {
            id: entity.id,
            user_id: entity.user_id,
            provider: entity.provider,
            provider_user_id: entity.provider_user_id,
        }
    }

    pub fn to_entity(oauth: &OAuth) -> OAuthEntity {
        OAuthEntity {
            id: oauth.id,
            user_id: oauth.user_id,
            provider: oauth.provider,
            provider_user_id: oauth.provider_user_id.clone(),
        }
    }

    pub fn map_to_entity(oauth: &OAuth, entity: &mut OAuthEntity) {
        entity.user_id = oauth.user_id;
        entity.provider = oauth.provider;
        entity.provider_user_id = oauth.provider_user_id.clone();
    }
}

pub mod terms_of_use {
    use crate::domain::TermsOfUse;
    use crate::entities::TermsOfUseEntity;

    pub fn to_domain(entity: TermsOfUseEntity) -> TermsOfUse {
        TermsOfUse {
            id: entity.id,
            created: entity.created,
        }
    }

    pub fn to_entity(terms: &TermsOfUse) -> TermsOfUseEntity {
        TermsOfUseEntity {
            id: terms.id,
            created: terms.created,
        }
    }

    pub fn map_to_entity(terms: &TermsOfUse, entity: &mut TermsOfUseEntity) {
        entity.created = terms.created;
    }
}

pub mod signed_terms_of_use {
    use crate::domain::SignedTermsOfUse;
    use crate::entities::SignedTermsOfUseEntity;

    pub fn to_domain(entity: SignedTermsOfUseEntity) -> SignedTermsOfUse {
        SignedTermsOfUse {
            id: entity.id,
            user_id: entity.user_id,
            termsofuse_id: entity.termsofuse_id,
            signed: entity.signed,
        }
    }

    pub fn to_entity(agreement: &SignedTermsOfUse) -> SignedTermsOfUseEntity {
        SignedTermsOfUseEntity {
            id: agreement.id,
            user_id: agreement.user_id,
            termsofuse_id: agreement.termsofuse_id,
            signed: agreement.signed,
        }
    }

    pub fn map_to_entity(agreement: &SignedTermsOfUse, entity: &mut SignedTermsOfUseEntity) {
        entity.user_id = agreement.user_id;
        entity.termsofuse_id = agreement.termsofuse_id;
        entity.signed = agreement.signed;
    }
}
