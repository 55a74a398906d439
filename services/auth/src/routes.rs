//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect},
    routing::{delete, get, post, put},
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    AppState,
    domain::OAuthProvider,
    error::AuthError,
    middleware::{AuthUser, auth_middleware},
    oauth::{OAUTH_STATE_TTL_SECONDS, OAuthClient, OAuthSession},
    services::{
        ActivateUserService, DeleteAccountService, LoginService, OAuthLoginService,
        PasswordResetService, RegistrationService, RequestPasswordResetService,
        UpdateAccountPasswordService, UserCompliancePermissionService, UserComplianceService,
        UserLogin, UserRegistration,
    },
    unit_of_work::{PgOAuthUnitOfWork, PgPasscodeUnitOfWork, PgTermsOfUseUnitOfWork, PgUserUnitOfWork},
    validation::{
        FormValidator, validate_confirmation, validate_email, validate_name, validate_password,
    },
};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Deserialize)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub password_confirmation: String,
}

/// Query string the provider redirects back with
#[derive(Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/terms/compliance", get(terms_compliance))
        .route("/auth/terms/accept", post(accept_terms))
        .route("/auth/account/password", put(update_password))
        .route("/auth/account", delete(delete_account))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/activate/:token", get(activate))
        .route("/auth/password/forgot", post(forgot_password))
        .route(
            "/auth/password/reset/:token",
            get(check_reset_token).post(reset_password),
        )
        .route("/auth/oauth/:provider", get(oauth_authorize))
        .route("/auth/oauth/:provider/callback", get(oauth_callback))
        .merge(protected)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);
    let cache = state.redis_pool.health_check().await.unwrap_or(false);

    let (status, label) = if database && cache {
        (StatusCode::OK, "ok")
    } else {
        warn!("Health check failed: database={} cache={}", database, cache);
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(serde_json::json!({
            "status": label,
            "service": "auth-service",
            "database": database,
            "cache": cache,
        })),
    )
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    FormValidator::new()
        .check("first_name", validate_name(&payload.first_name))
        .check("last_name", validate_name(&payload.last_name))
        .check("email", validate_email(&payload.email))
        .check("password", validate_password(&payload.password))
        .check(
            "password_confirmation",
            validate_confirmation(&payload.password, &payload.password_confirmation),
        )
        .finish()?;

    let registration = UserRegistration {
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        password: payload.password,
    };

    let unit_of_work = PgPasscodeUnitOfWork::new(state.db_pool.clone(), None);
    let user = RegistrationService::new(
        unit_of_work,
        state.password_hasher.as_ref(),
        state.email_sender.as_ref(),
        &state.config,
    )
    .register(&registration)
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<UserLogin>,
) -> Result<impl IntoResponse, AuthError> {
    let unit_of_work = PgUserUnitOfWork::new(state.db_pool.clone(), None);
    let user = LoginService::new(unit_of_work, state.password_hasher.as_ref())
        .login(&payload)
        .await?;

    Ok(Json(state.jwt_service.issue(&user)?))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Logout request for user: {}", auth.user_id);

    state
        .jwt_service
        .blacklist_token(&state.redis_pool, &auth.token, auth.exp)
        .await?;

    Ok(Json(
        serde_json::json!({"message": "Logged out successfully"}),
    ))
}

pub async fn activate(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> Result<impl IntoResponse, AuthError> {
    let unit_of_work = PgPasscodeUnitOfWork::new(state.db_pool.clone(), None);
    ActivateUserService::new(unit_of_work).activate(token).await?;

    Ok(Json(serde_json::json!({"message": "Account activated"})))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, AuthError> {
    FormValidator::new()
        .check("email", validate_email(&payload.email))
        .finish()?;

    let unit_of_work = PgPasscodeUnitOfWork::new(state.db_pool.clone(), None);
    RequestPasswordResetService::new(unit_of_work, state.email_sender.as_ref(), &state.config)
        .request_reset(&payload.email)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({"message": "Password reset email sent"})),
    ))
}

pub async fn check_reset_token(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> Result<impl IntoResponse, AuthError> {
    let unit_of_work = PgPasscodeUnitOfWork::new(state.db_pool.clone(), None);
    PasswordResetService::new(unit_of_work, state.password_hasher.as_ref())
        .check_token(token)
        .await?;

    Ok(Json(serde_json::json!({"valid": true})))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AuthError> {
    FormValidator::new()
        .check("password", validate_password(&payload.password))
        .check(
            "password_confirmation",
            validate_confirmation(&payload.password, &payload.password_confirmation),
        )
        .finish()?;

    let unit_of_work = PgPasscodeUnitOfWork::new(state.db_pool.clone(), None);
    PasswordResetService::new(unit_of_work, state.password_hasher.as_ref())
        .reset_password(token, &payload.password)
        .await?;

    Ok(Json(serde_json::json!({"message": "Password updated"})))
}

fn oauth_client(state: &AppState, provider: &str) -> Result<Arc<dyn OAuthClient>, AuthError> {
    let provider: OAuthProvider = provider
        .parse()
        .map_err(|_| AuthError::UnknownProvider(provider.to_string()))?;

    state
        .oauth_clients
        .get(&provider)
        .cloned()
        .ok_or_else(|| AuthError::UnknownProvider(provider.to_string()))
}

/// Send the browser to the provider, remembering the CSRF state and PKCE
/// verifier until it comes back
pub async fn oauth_authorize(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<impl IntoResponse, AuthError> {
    let client = oauth_client(&state, &provider)?;
    let request = client.authorization_url();

    let session = OAuthSession {
        csrf_token: request.csrf_state.clone(),
        pkce_verifier: request.pkce_verifier,
        provider: client.provider(),
        created_at: Utc::now().timestamp(),
    };
    state
        .redis_pool
        .set_json(
            &OAuthSession::key(&request.csrf_state),
            &session,
            Some(OAUTH_STATE_TTL_SECONDS),
        )
        .await?;

    Ok(Redirect::to(&request.url))
}

pub async fn oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<impl IntoResponse, AuthError> {
    let client = oauth_client(&state, &provider)?;

    if let Some(error) = query.error {
        warn!("{} refused the authorization: {}", provider, error);
        return Err(AuthError::InvalidOAuthState);
    }
    let (Some(code), Some(csrf_state)) = (query.code, query.state) else {
        return Err(AuthError::InvalidOAuthState);
    };

    let session: OAuthSession = state
        .redis_pool
        .take_json(&OAuthSession::key(&csrf_state))
        .await?
        .ok_or(AuthError::InvalidOAuthState)?;
    if session.provider != client.provider() || session.csrf_token != csrf_state {
        return Err(AuthError::InvalidOAuthState);
    }

    let unit_of_work = PgOAuthUnitOfWork::new(state.db_pool.clone(), None);
    let user = OAuthLoginService::new(unit_of_work, client.as_ref())
        .login(&code, &session.pkce_verifier)
        .await?;

    Ok(Json(state.jwt_service.issue(&user)?))
}

pub async fn terms_compliance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, AuthError> {
    let unit_of_work = PgTermsOfUseUnitOfWork::new(state.db_pool.clone(), None);
    let compliant = UserCompliancePermissionService::new(unit_of_work)
        .is_user_compliant(auth.user_id)
        .await?;

    Ok(Json(serde_json::json!({"compliant": compliant})))
}

pub async fn accept_terms(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, AuthError> {
    let unit_of_work = PgTermsOfUseUnitOfWork::new(state.db_pool.clone(), None);
    UserComplianceService::new(unit_of_work)
        .make_user_compliant(auth.user_id)
        .await?;

    Ok(Json(serde_json::json!({"message": "Terms of use accepted"})))
}

pub async fn update_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, AuthError> {
    FormValidator::new()
        .check("new_password", validate_password(&payload.new_password))
        .check(
            "password_confirmation",
            validate_confirmation(&payload.new_password, &payload.password_confirmation),
        )
        .finish()?;

    let unit_of_work = PgUserUnitOfWork::new(state.db_pool.clone(), None);
    UpdateAccountPasswordService::new(unit_of_work, state.password_hasher.as_ref())
        .update_password(
            auth.user_id,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    Ok(Json(serde_json::json!({"message": "Password updated"})))
}

/// Delete the caller's account and revoke the token used to do it
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, AuthError> {
    let unit_of_work = PgUserUnitOfWork::new(state.db_pool.clone(), None);
    DeleteAccountService::new(unit_of_work)
        .delete(auth.user_id)
        .await?;

    state
        .jwt_service
        .blacklist_token(&state.redis_pool, &auth.token, auth.exp)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
