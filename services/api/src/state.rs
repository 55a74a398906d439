//! Application state shared across handlers

use std::sync::Arc;

use crate::{middleware::JwtVerifier, repositories::PopulationDal};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dal: Arc<dyn PopulationDal>,
    pub jwt_verifier: JwtVerifier,
}
