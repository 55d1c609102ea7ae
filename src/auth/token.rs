// JWT token generation and validation service

use crate::auth::error::AuthError;
use crate::config::AuthConfig;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which kind of credential a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i32,
    pub token_type: TokenType,
    /// Unique per issued token
    pub jti: String,
    /// Expiry, seconds since the epoch
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// A signed token together with its expiry
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Access and refresh token issued together
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Token service for JWT operations
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl TokenService {
    /// Create a TokenService from the auth configuration
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_token_ttl: config.access_token_ttl,
            refresh_token_ttl: config.refresh_token_ttl,
        }
    }

    fn sign(&self, user_id: i32, token_type: TokenType) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.access_token_ttl,
            TokenType::Refresh => self.refresh_token_ttl,
        };
        let expires_at = now + ttl;

        let claims = Claims {
            sub: user_id,
            token_type,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGenerationError(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
        })
    }

    /// Generate an access and refresh token for a user
    pub fn issue_pair(&self, user_id: i32) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access: self.sign(user_id, TokenType::Access)?,
            refresh: self.sign(user_id, TokenType::Refresh)?,
        })
    }

    /// Generate a standalone refresh token (used by rotation)
    pub fn issue_refresh(&self, user_id: i32) -> Result<IssuedToken, AuthError> {
        self.sign(user_id, TokenType::Refresh)
    }

    /// Derive a fresh access token from verified refresh token claims
    pub fn issue_access(&self, refresh: &Claims) -> Result<IssuedToken, AuthError> {
        if refresh.token_type != TokenType::Refresh {
            return Err(AuthError::InvalidToken);
        }
        self.sign(refresh.sub, TokenType::Access)
    }

    /// Validate a token's signature, structure, expiry and type
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })?;

        if claims.token_type != expected {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }
}
