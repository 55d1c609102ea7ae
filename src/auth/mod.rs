// Authentication module
// Registration, login, token renewal and logout backed by an outstanding
// refresh token ledger

pub mod commands;
pub mod error;
pub mod handlers;
pub mod ledger;
#[cfg(test)]
pub mod memory;
pub mod middleware;
pub mod models;
pub mod password;
pub mod policy;
pub mod repository;
pub mod service;
pub mod token;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

// Re-export commonly used types
pub use error::AuthError;
pub use ledger::{OutstandingTokenLedger, PgTokenLedger};
pub use middleware::AuthenticatedUser;
pub use repository::{PgUserRepository, UserStore};
pub use service::AuthService;

/// Routes of the session lifecycle
pub fn router<S>() -> Router<S>
where
    Arc<AuthService>: FromRef<S>,
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/signup/", post(handlers::signup_handler))
        .route(
            "/signup/password-requirements/",
            get(handlers::password_requirements_handler),
        )
        .route("/login/", post(handlers::login_handler))
        .route("/login/renew/", post(handlers::renew_handler))
        .route("/logout/", post(handlers::logout_handler))
        .route("/logout/all/", post(handlers::logout_all_handler))
}
