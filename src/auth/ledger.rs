// Outstanding refresh token ledger
//
// Allow-list of refresh tokens the server still honours. A refresh token is
// live only while a row with its digest exists and `expires_at` is in the
// future; expiry is checked on every lookup, there is no background reaper.

use crate::auth::{error::AuthError, models::OutstandingToken};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::{PgConnection, PgPool};

/// Hash a token using SHA-256 (lower-case hex)
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Short, non-reversible handle for log lines
pub fn token_fingerprint(token: &str) -> String {
    hash_token(token)[..8].to_string()
}

/// Insert one ledger row on an existing connection or transaction
pub(crate) async fn insert_token(
    conn: &mut PgConnection,
    user_id: i32,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO outstanding_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)",
    )
    .bind(user_id)
    .bind(hash_token(token))
    .bind(expires_at)
    .execute(conn)
    .await?;

    Ok(())
}

#[async_trait]
pub trait OutstandingTokenLedger: Send + Sync {
    /// Store a refresh token (hashed) for a user
    async fn record(
        &self,
        user_id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError>;

    /// The live row for a token, if any; expired rows are treated as absent
    async fn find_live(&self, token: &str) -> Result<Option<OutstandingToken>, AuthError>;

    /// Whether the token is still honoured
    async fn is_live(&self, token: &str) -> Result<bool, AuthError> {
        Ok(self.find_live(token).await?.is_some())
    }

    /// Delete the live row for `token` owned by `user_id`
    /// Returns false when no such live row exists
    async fn revoke(&self, user_id: i32, token: &str) -> Result<bool, AuthError>;

    /// Atomically replace a live token with a new one
    /// Returns false (and records nothing) when `old_token` is no longer live
    async fn rotate(
        &self,
        user_id: i32,
        old_token: &str,
        new_token: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<bool, AuthError>;

    /// Delete every row for a user; returns how many were deleted
    async fn revoke_all(&self, user_id: i32) -> Result<u64, AuthError>;

    /// Delete rows whose expiry has passed
    async fn purge_expired(&self) -> Result<u64, AuthError>;
}

/// PostgreSQL-backed ledger
#[derive(Clone)]
pub struct PgTokenLedger {
    pool: PgPool,
}

impl PgTokenLedger {
    /// Create a new PgTokenLedger
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OutstandingTokenLedger for PgTokenLedger {
    async fn record(
        &self,
        user_id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let mut conn = self.pool.acquire().await?;
        insert_token(&mut *conn, user_id, token, expires_at).await?;
        Ok(())
    }

    async fn find_live(&self, token: &str) -> Result<Option<OutstandingToken>, AuthError> {
        let row = sqlx::query_as::<_, OutstandingToken>(
            "SELECT id, user_id, token_hash, expires_at, created_at
             FROM outstanding_tokens
             WHERE token_hash = $1 AND expires_at > NOW()",
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn revoke(&self, user_id: i32, token: &str) -> Result<bool, AuthError> {
        let result = sqlx::query(
            "DELETE FROM outstanding_tokens
             WHERE token_hash = $1 AND user_id = $2 AND expires_at > NOW()",
        )
        .bind(hash_token(token))
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn rotate(
        &self,
        user_id: i32,
        old_token: &str,
        new_token: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        // Dropping the transaction without commit rolls it back
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            "DELETE FROM outstanding_tokens
             WHERE token_hash = $1 AND user_id = $2 AND expires_at > NOW()",
        )
        .bind(hash_token(old_token))
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        insert_token(&mut *tx, user_id, new_token, new_expires_at).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn revoke_all(&self, user_id: i32) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM outstanding_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn purge_expired(&self) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM outstanding_tokens WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
