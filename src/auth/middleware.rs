// Bearer authentication for protected routes

use crate::auth::{error::AuthError, service::AuthService};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use std::sync::Arc;
use tracing::debug;

/// Authenticated user extractor for protected routes
///
/// Requires `Authorization: Bearer <access token>`. Any failure rejects the
/// request with a bare 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i32,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidToken)?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            debug!("Authorization header without Bearer scheme");
            AuthError::InvalidToken
        })?;

        let service = Arc::<AuthService>::from_ref(state);
        let user_id = service.authenticate_bearer(token)?;

        Ok(AuthenticatedUser { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::memory::{MemoryTokenLedger, MemoryUserStore};
    use crate::auth::token::{Claims, TokenType};
    use crate::config::AuthConfig;
    use axum::http::Request;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use proptest::prelude::*;

    const SECRET: &str = "test_secret_key_for_testing_purposes";

    fn test_service() -> Arc<AuthService> {
        let ledger = Arc::new(MemoryTokenLedger::default());
        Arc::new(AuthService::new(
            Arc::new(MemoryUserStore::new(ledger.clone())),
            ledger,
            &AuthConfig::with_secret(SECRET),
        ))
    }

    // Helper to create test parts with Authorization header
    fn create_parts_with_auth(auth_value: &str) -> Parts {
        let req = Request::builder()
            .uri("/")
            .header(header::AUTHORIZATION, auth_value)
            .body(())
            .unwrap();

        let (parts, _) = req.into_parts();
        parts
    }

    fn create_parts_without_auth() -> Parts {
        let (parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();
        parts
    }

    async fn extract(
        service: &Arc<AuthService>,
        auth_value: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        let mut parts = create_parts_with_auth(auth_value);
        AuthenticatedUser::from_request_parts(&mut parts, service).await
    }

    #[tokio::test]
    async fn test_valid_access_token_is_accepted() {
        let service = test_service();
        let pair = service.tokens().issue_pair(42).unwrap();

        let user = extract(&service, &format!("Bearer {}", pair.access.token)).await.unwrap();
        assert_eq!(user.user_id, 42);
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_a_bearer_credential() {
        let service = test_service();
        let pair = service.tokens().issue_pair(42).unwrap();

        let result = extract(&service, &format!("Bearer {}", pair.refresh.token)).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let service = test_service();
        let claims = Claims {
            sub: 1,
            token_type: TokenType::Access,
            jti: "expired".to_string(),
            iat: Utc::now().timestamp() - 1000,
            exp: Utc::now().timestamp() - 500,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let result = extract(&service, &format!("Bearer {}", token)).await;
        assert!(matches!(result, Err(AuthError::ExpiredToken)));
    }

    #[tokio::test]
    async fn test_missing_authorization_header() {
        let service = test_service();
        let mut parts = create_parts_without_auth();
        let result = AuthenticatedUser::from_request_parts(&mut parts, &service).await;

        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[tokio::test]
    async fn test_invalid_bearer_format() {
        let service = test_service();
        let token = service.tokens().issue_pair(1).unwrap().access.token;

        for auth_value in [
            token.clone(),
            format!("Token {}", token),
            "Basic dXNlcjpwYXNz".to_string(),
        ] {
            assert!(matches!(
                extract(&service, &auth_value).await,
                Err(AuthError::InvalidToken)
            ));
        }
    }

    proptest! {
        #[test]
        fn prop_malformed_tokens_rejected(malformed in "[a-zA-Z0-9]{10,50}") {
            let service = test_service();
            let rt = tokio::runtime::Runtime::new().unwrap();
            let result = rt.block_on(extract(&service, &format!("Bearer {}", malformed)));

            prop_assert!(result.is_err());
        }
    }
}
