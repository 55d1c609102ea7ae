// Authentication data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;

/// User database model
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
}

/// Fields accepted when creating an account
///
/// There is no way to set the privileged flags from here; the store applies
/// the defaults (active, not staff, not superuser).
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Already normalized (trimmed, lower-cased)
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// Outstanding refresh token row
///
/// Only the SHA-256 digest of the token is ever stored.
#[derive(Debug, Clone, FromRow)]
pub struct OutstandingToken {
    pub id: i32,
    pub user_id: i32,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OutstandingToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Signup request body
///
/// Fields are kept as raw JSON so type mismatches can be reported per field.
/// Unknown fields, including `is_staff`, `is_superuser` and `is_active`,
/// are dropped during deserialization.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SignupRequest {
    #[schema(value_type = Option<String>, example = "John")]
    pub first_name: Option<Value>,
    #[schema(value_type = Option<String>, example = "Doe")]
    pub last_name: Option<Value>,
    #[schema(value_type = Option<String>, example = "jdoe@example.com")]
    pub email: Option<Value>,
    #[schema(value_type = Option<String>, example = "ABC123!xyz")]
    pub password: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub password1: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub password2: Option<Value>,
}

/// Login request body
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(value_type = Option<String>, example = "jdoe@example.com")]
    pub email: Option<Value>,
    #[schema(value_type = Option<String>, example = "ABC123!xyz")]
    pub password: Option<Value>,
}

/// Body of renew and logout requests
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    #[schema(value_type = Option<String>)]
    pub refresh_token: Option<Value>,
}

/// Response of signup and login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
}

/// Response of a renewal
///
/// `refresh_token` is present only when rotation is enabled.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenewResponse {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
}

/// Password requirements listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PasswordRequirementsResponse {
    pub password_requirements: Vec<String>,
}

/// Empty JSON object body (`{}`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct EmptyResponse {}
