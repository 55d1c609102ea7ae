// HTTP handlers for authentication endpoints

use crate::auth::{
    commands::{
        AuthCommand, AuthOutput, LoginCommand, LogoutCommand, RenewCommand, SignupCommand,
    },
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{LoginRequest, PasswordRequirementsResponse, RefreshTokenRequest, SignupRequest},
    service::AuthService,
};
use axum::{extract::State, Json};
use std::sync::Arc;

// A missing or unparseable body is treated as an empty object so every
// field shows up as required.
type JsonBody<T> = Option<Json<T>>;

fn body<T: Default>(body: JsonBody<T>) -> T {
    body.map(|Json(inner)| inner).unwrap_or_default()
}

async fn run(
    service: &AuthService,
    command: AuthCommand,
) -> Result<Json<AuthOutput>, AuthError> {
    service.execute(command).await.map(Json)
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/signup/",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created",
            body = crate::auth::models::SessionResponse),
        (status = 400, description = "Validation failed or account exists",
            body = crate::error::ErrorBody,
            example = json!({"errors": ["EMAIL_REQUIRED", "PASSWORD_TOO_WEAK"]})),
        (status = 500, description = "Internal server error", body = crate::error::ErrorBody)
    ),
    tag = "auth"
)]
pub async fn signup_handler(
    State(service): State<Arc<AuthService>>,
    request: JsonBody<SignupRequest>,
) -> Result<Json<AuthOutput>, AuthError> {
    let command = SignupCommand::validate(&body(request), service.policy())?;
    run(&service, AuthCommand::Signup(command)).await
}

/// List the password composition rules
#[utoipa::path(
    get,
    path = "/signup/password-requirements/",
    responses(
        (status = 200, description = "Human-readable password rules",
            body = PasswordRequirementsResponse)
    ),
    tag = "auth"
)]
pub async fn password_requirements_handler(
    State(service): State<Arc<AuthService>>,
) -> Json<PasswordRequirementsResponse> {
    Json(service.password_requirements())
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/login/",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = crate::auth::models::SessionResponse),
        (status = 400, description = "Missing fields or invalid credentials",
            body = crate::error::ErrorBody,
            example = json!({"errors": ["INVALID_CREDENTIALS"]})),
        (status = 500, description = "Internal server error", body = crate::error::ErrorBody)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(service): State<Arc<AuthService>>,
    request: JsonBody<LoginRequest>,
) -> Result<Json<AuthOutput>, AuthError> {
    let command = LoginCommand::validate(&body(request))?;
    run(&service, AuthCommand::Login(command)).await
}

/// Obtain a new access token from a refresh token
#[utoipa::path(
    post,
    path = "/login/renew/",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Access token renewed",
            body = crate::auth::models::RenewResponse),
        (status = 400, description = "Refresh token missing or not honoured",
            body = crate::error::ErrorBody,
            example = json!({"errors": ["INVALID_REFRESH_TOKEN"]})),
        (status = 401, description = "No valid bearer token")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn renew_handler(
    State(service): State<Arc<AuthService>>,
    user: AuthenticatedUser,
    request: JsonBody<RefreshTokenRequest>,
) -> Result<Json<AuthOutput>, AuthError> {
    let command = RenewCommand::validate(user.user_id, &body(request))?;
    run(&service, AuthCommand::Renew(command)).await
}

/// Revoke one refresh token of the caller
#[utoipa::path(
    post,
    path = "/logout/",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Refresh token revoked",
            body = crate::auth::models::EmptyResponse),
        (status = 400, description = "Refresh token missing or not honoured",
            body = crate::error::ErrorBody,
            example = json!({"errors": ["REFRESH_TOKEN_REQUIRED"]})),
        (status = 401, description = "No valid bearer token")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout_handler(
    State(service): State<Arc<AuthService>>,
    user: AuthenticatedUser,
    request: JsonBody<RefreshTokenRequest>,
) -> Result<Json<AuthOutput>, AuthError> {
    let command = LogoutCommand::validate(user.user_id, &body(request))?;
    run(&service, AuthCommand::Logout(command)).await
}

/// Revoke every refresh token of the caller
#[utoipa::path(
    post,
    path = "/logout/all/",
    responses(
        (status = 200, description = "All refresh tokens revoked",
            body = crate::auth::models::EmptyResponse),
        (status = 401, description = "No valid bearer token")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout_all_handler(
    State(service): State<Arc<AuthService>>,
    user: AuthenticatedUser,
) -> Result<Json<AuthOutput>, AuthError> {
    run(&service, AuthCommand::LogoutAll { user_id: user.user_id }).await
}
