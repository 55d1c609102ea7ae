// Session lifecycle and registration

use crate::auth::{
    commands::{
        AuthCommand, AuthOutput, LoginCommand, LogoutCommand, RenewCommand, SignupCommand,
    },
    error::AuthError,
    ledger::{token_fingerprint, OutstandingTokenLedger},
    models::{
        EmptyResponse, NewUser, PasswordRequirementsResponse, RenewResponse, SessionResponse,
        User,
    },
    password::PasswordService,
    policy::PasswordPolicy,
    repository::UserStore,
    token::{TokenPair, TokenService, TokenType},
};
use crate::config::AuthConfig;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Authentication service orchestrating the credential store, the token
/// issuer and the outstanding token ledger
pub struct AuthService {
    users: Arc<dyn UserStore>,
    ledger: Arc<dyn OutstandingTokenLedger>,
    tokens: TokenService,
    policy: PasswordPolicy,
    rotate_refresh_tokens: bool,
    signup_issues_session: bool,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        users: Arc<dyn UserStore>,
        ledger: Arc<dyn OutstandingTokenLedger>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            users,
            ledger,
            tokens: TokenService::new(config),
            policy: PasswordPolicy::new(config.password.clone()),
            rotate_refresh_tokens: config.rotate_refresh_tokens,
            signup_issues_session: config.signup_issues_session,
        }
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Run a validated command
    pub async fn execute(&self, command: AuthCommand) -> Result<AuthOutput, AuthError> {
        match command {
            AuthCommand::Signup(cmd) => self.signup(cmd).await.map(AuthOutput::Session),
            AuthCommand::Login(cmd) => self.login(cmd).await.map(AuthOutput::Session),
            AuthCommand::Renew(cmd) => self.renew(cmd).await.map(AuthOutput::Renewed),
            AuthCommand::Logout(cmd) => self
                .logout(cmd)
                .await
                .map(|_| AuthOutput::Done(EmptyResponse {})),
            AuthCommand::LogoutAll { user_id } => self
                .logout_all(user_id)
                .await
                .map(|_| AuthOutput::Done(EmptyResponse {})),
        }
    }

    /// Create an account, and log it in unless configured otherwise
    ///
    /// The account and its first refresh token are stored together or not at
    /// all.
    pub async fn signup(&self, cmd: SignupCommand) -> Result<SessionResponse, AuthError> {
        if self.users.email_exists(&cmd.email).await? {
            debug!("Signup rejected, email already registered");
            return Err(AuthError::AccountAlreadyExists);
        }

        let new_user = NewUser {
            password_hash: PasswordService::hash_password(&cmd.password)?,
            email: cmd.email,
            first_name: cmd.first_name,
            last_name: cmd.last_name,
        };

        if !self.signup_issues_session {
            let user = self.users.create_user(&new_user).await?;
            info!("Created account user_id={}", user.id);
            return Ok(session_response(&user));
        }

        let issue = |user_id: i32| self.tokens.issue_pair(user_id);
        let (user, pair) = self.users.create_user_with_session(&new_user, &issue).await?;

        info!("Created account user_id={} with session", user.id);
        Ok(session_with_tokens(&user, pair))
    }

    /// Authenticate by email and password and open a session
    ///
    /// Every failure is reported as `InvalidCredentials`.
    pub async fn login(&self, cmd: LoginCommand) -> Result<SessionResponse, AuthError> {
        let user = match self.users.find_by_email(&cmd.email).await? {
            Some(user) => user,
            None => {
                PasswordService::verify_dummy(&cmd.password);
                debug!("Login failed, no such account");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let password_ok = PasswordService::verify_password(&cmd.password, &user.password_hash)?;
        if !password_ok {
            debug!("Login failed for user_id={}, wrong password", user.id);
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_active {
            debug!("Login failed for user_id={}, account inactive", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        self.users.touch_last_login(user.id).await?;
        let session = self.start_session(&user).await?;

        info!("User logged in: user_id={}", user.id);
        Ok(session)
    }

    /// Issue a fresh access token from a live refresh token
    ///
    /// With rotation enabled the presented refresh token is consumed and a new
    /// one is returned.
    pub async fn renew(&self, cmd: RenewCommand) -> Result<RenewResponse, AuthError> {
        let fingerprint = token_fingerprint(&cmd.refresh_token);
        let claims = self
            .tokens
            .verify(&cmd.refresh_token, TokenType::Refresh)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        if claims.sub != cmd.user_id {
            warn!(
                "Renew with refresh token {} of another user (bearer user_id={})",
                fingerprint, cmd.user_id
            );
            return Err(AuthError::InvalidRefreshToken);
        }

        match self.ledger.find_live(&cmd.refresh_token).await? {
            Some(row) if row.user_id == cmd.user_id => {}
            _ => {
                debug!("Renew with refresh token {} not in ledger", fingerprint);
                return Err(AuthError::InvalidRefreshToken);
            }
        }

        let access = self.tokens.issue_access(&claims)?;

        if !self.rotate_refresh_tokens {
            debug!("Renewed access token for user_id={}", cmd.user_id);
            return Ok(RenewResponse {
                access_token: access.token,
                access_token_expires_at: access.expires_at,
                refresh_token: None,
                refresh_token_expires_at: None,
            });
        }

        let refresh = self.tokens.issue_refresh(cmd.user_id)?;
        let rotated = self
            .ledger
            .rotate(cmd.user_id, &cmd.refresh_token, &refresh.token, refresh.expires_at)
            .await?;
        if !rotated {
            // Lost a race with another renew or a logout of the same token
            warn!("Refresh token {} revoked during rotation", fingerprint);
            return Err(AuthError::InvalidRefreshToken);
        }

        debug!(
            "Rotated refresh token {} -> {} for user_id={}",
            fingerprint,
            token_fingerprint(&refresh.token),
            cmd.user_id
        );

        Ok(RenewResponse {
            access_token: access.token,
            access_token_expires_at: access.expires_at,
            refresh_token: Some(refresh.token),
            refresh_token_expires_at: Some(refresh.expires_at),
        })
    }

    /// Revoke one refresh token owned by the caller
    pub async fn logout(&self, cmd: LogoutCommand) -> Result<(), AuthError> {
        let fingerprint = token_fingerprint(&cmd.refresh_token);
        let claims = self
            .tokens
            .verify(&cmd.refresh_token, TokenType::Refresh)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        if claims.sub != cmd.user_id {
            warn!(
                "Logout with refresh token {} of another user (bearer user_id={})",
                fingerprint, cmd.user_id
            );
            return Err(AuthError::InvalidRefreshToken);
        }

        if !self.ledger.revoke(cmd.user_id, &cmd.refresh_token).await? {
            debug!("Logout with refresh token {} not in ledger", fingerprint);
            return Err(AuthError::InvalidRefreshToken);
        }

        info!("User logged out: user_id={}, token={}", cmd.user_id, fingerprint);
        Ok(())
    }

    /// Revoke every refresh token of the caller; succeeds with nothing to revoke
    pub async fn logout_all(&self, user_id: i32) -> Result<u64, AuthError> {
        let revoked = self.ledger.revoke_all(user_id).await?;
        info!("User logged out everywhere: user_id={}, revoked={}", user_id, revoked);
        Ok(revoked)
    }

    /// Resolve a bearer access token to its user id
    pub fn authenticate_bearer(&self, token: &str) -> Result<i32, AuthError> {
        self.tokens
            .verify(token, TokenType::Access)
            .map(|claims| claims.sub)
    }

    pub fn password_requirements(&self) -> PasswordRequirementsResponse {
        PasswordRequirementsResponse {
            password_requirements: self.policy.help_texts(),
        }
    }

    /// Drop expired ledger rows
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        let purged = self.ledger.purge_expired().await?;
        info!("Purged {} expired refresh tokens", purged);
        Ok(purged)
    }

    async fn start_session(&self, user: &User) -> Result<SessionResponse, AuthError> {
        let pair = self.tokens.issue_pair(user.id)?;
        self.ledger
            .record(user.id, &pair.refresh.token, pair.refresh.expires_at)
            .await?;

        debug!(
            "Recorded refresh token {} for user_id={}",
            token_fingerprint(&pair.refresh.token),
            user.id
        );

        Ok(session_with_tokens(user, pair))
    }
}

fn session_with_tokens(user: &User, pair: TokenPair) -> SessionResponse {
    SessionResponse {
        access_token: Some(pair.access.token),
        access_token_expires_at: Some(pair.access.expires_at),
        refresh_token: Some(pair.refresh.token),
        refresh_token_expires_at: Some(pair.refresh.expires_at),
        ..session_response(user)
    }
}

fn session_response(user: &User) -> SessionResponse {
    SessionResponse {
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        access_token: None,
        access_token_expires_at: None,
        refresh_token: None,
        refresh_token_expires_at: None,
    }
}
