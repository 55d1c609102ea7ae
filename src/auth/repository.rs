// Credential store: persisted user accounts

use crate::auth::{
    error::AuthError,
    ledger::insert_token,
    models::{NewUser, User},
    token::TokenPair,
};
use async_trait::async_trait;
use sqlx::PgPool;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, \
     is_active, is_staff, is_superuser, last_login, date_joined";

/// Signs the first token pair once the new user's id is known
pub type SessionIssuer<'a> = &'a (dyn Fn(i32) -> Result<TokenPair, AuthError> + Send + Sync);

fn insert_user_sql() -> String {
    format!(
        "INSERT INTO users (email, password_hash, first_name, last_name)
         VALUES ($1, $2, $3, $4)
         RETURNING {USER_COLUMNS}"
    )
}

fn insert_user_error(err: sqlx::Error) -> AuthError {
    // Check for unique constraint violation
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AuthError::AccountAlreadyExists;
        }
    }
    AuthError::DatabaseError(err.to_string())
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a new user with default flags
    /// Fails with `AccountAlreadyExists` if the email is taken
    async fn create_user(&self, new_user: &NewUser) -> Result<User, AuthError>;

    /// Create a user and record its first refresh token as one unit
    /// Nothing is persisted when any step fails
    async fn create_user_with_session(
        &self,
        new_user: &NewUser,
        issue: SessionIssuer<'_>,
    ) -> Result<(User, TokenPair), AuthError>;

    /// Find a user by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    /// Check if an email exists (case-insensitive)
    async fn email_exists(&self, email: &str) -> Result<bool, AuthError>;

    /// Stamp the user's last successful login
    async fn touch_last_login(&self, user_id: i32) -> Result<(), AuthError>;
}

/// User repository for database operations
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn create_user(&self, new_user: &NewUser) -> Result<User, AuthError> {
        let user = sqlx::query_as::<_, User>(&insert_user_sql())
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(&new_user.first_name)
            .bind(&new_user.last_name)
            .fetch_one(&self.pool)
            .await
            .map_err(insert_user_error)?;

        Ok(user)
    }

    async fn create_user_with_session(
        &self,
        new_user: &NewUser,
        issue: SessionIssuer<'_>,
    ) -> Result<(User, TokenPair), AuthError> {
        // Dropping the transaction without commit rolls it back
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&insert_user_sql())
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(&new_user.first_name)
            .bind(&new_user.last_name)
            .fetch_one(&mut *tx)
            .await
            .map_err(insert_user_error)?;

        let pair = issue(user.id)?;
        insert_token(&mut *tx, user.id, &pair.refresh.token, pair.refresh.expires_at).await?;

        tx.commit().await?;
        Ok((user, pair))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists.0)
    }

    async fn touch_last_login(&self, user_id: i32) -> Result<(), AuthError> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
