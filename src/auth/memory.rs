// In-memory stores for tests

use crate::auth::{
    error::AuthError,
    ledger::{hash_token, OutstandingTokenLedger},
    models::{NewUser, OutstandingToken, User},
    repository::{SessionIssuer, UserStore},
    token::TokenPair,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Users in a vector; signup sessions are recorded in the given ledger
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
    ledger: Arc<dyn OutstandingTokenLedger>,
}

impl MemoryUserStore {
    pub fn new(ledger: Arc<dyn OutstandingTokenLedger>) -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            ledger,
        }
    }

    fn build_user(users: &[User], new_user: &NewUser) -> Result<User, AuthError> {
        if users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(AuthError::AccountAlreadyExists);
        }

        Ok(User {
            id: users.len() as i32 + 1,
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            last_login: None,
            date_joined: Utc::now(),
        })
    }

    /// Snapshot of a stored user, for assertions
    pub async fn get(&self, email: &str) -> Option<User> {
        self.find_by_email(email).await.ok().flatten()
    }

    /// Flip the active flag, simulating an admin action
    pub async fn set_active(&self, user_id: i32, active: bool) {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.is_active = active;
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, new_user: &NewUser) -> Result<User, AuthError> {
        let mut users = self.users.write().await;
        let user = Self::build_user(&users, new_user)?;
        users.push(user.clone());
        Ok(user)
    }

    async fn create_user_with_session(
        &self,
        new_user: &NewUser,
        issue: SessionIssuer<'_>,
    ) -> Result<(User, TokenPair), AuthError> {
        // The user is only pushed once the ledger accepted the token
        let mut users = self.users.write().await;
        let user = Self::build_user(&users, new_user)?;
        let pair = issue(user.id)?;
        self.ledger
            .record(user.id, &pair.refresh.token, pair.refresh.expires_at)
            .await?;
        users.push(user.clone());
        Ok((user, pair))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn touch_last_login(&self, user_id: i32) -> Result<(), AuthError> {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTokenLedger {
    rows: RwLock<HashMap<String, OutstandingToken>>,
}

impl MemoryTokenLedger {
    /// Number of rows, live or not
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Number of live rows for a user
    pub async fn live_count(&self, user_id: i32) -> usize {
        let now = Utc::now();
        self.rows
            .read()
            .await
            .values()
            .filter(|row| row.user_id == user_id && !row.is_expired_at(now))
            .count()
    }

    /// Push a row's expiry into the past
    pub async fn expire(&self, token: &str) {
        if let Some(row) = self.rows.write().await.get_mut(&hash_token(token)) {
            row.expires_at = Utc::now() - chrono::Duration::seconds(1);
        }
    }

    fn insert(
        rows: &mut HashMap<String, OutstandingToken>,
        user_id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) {
        let token_hash = hash_token(token);
        let row = OutstandingToken {
            id: rows.len() as i32 + 1,
            user_id,
            token_hash: token_hash.clone(),
            expires_at,
            created_at: Utc::now(),
        };
        rows.insert(token_hash, row);
    }

    fn take_live(
        rows: &mut HashMap<String, OutstandingToken>,
        user_id: i32,
        token: &str,
    ) -> bool {
        let token_hash = hash_token(token);
        let live = rows
            .get(&token_hash)
            .map(|row| row.user_id == user_id && !row.is_expired_at(Utc::now()))
            .unwrap_or(false);
        if live {
            rows.remove(&token_hash);
        }
        live
    }
}

#[async_trait]
impl OutstandingTokenLedger for MemoryTokenLedger {
    async fn record(
        &self,
        user_id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let mut rows = self.rows.write().await;
        Self::insert(&mut rows, user_id, token, expires_at);
        Ok(())
    }

    async fn find_live(&self, token: &str) -> Result<Option<OutstandingToken>, AuthError> {
        let now = Utc::now();
        Ok(self
            .rows
            .read()
            .await
            .get(&hash_token(token))
            .filter(|row| !row.is_expired_at(now))
            .cloned())
    }

    async fn revoke(&self, user_id: i32, token: &str) -> Result<bool, AuthError> {
        let mut rows = self.rows.write().await;
        Ok(Self::take_live(&mut rows, user_id, token))
    }

    async fn rotate(
        &self,
        user_id: i32,
        old_token: &str,
        new_token: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        // One write guard covers both steps
        let mut rows = self.rows.write().await;
        if !Self::take_live(&mut rows, user_id, old_token) {
            return Ok(false);
        }
        Self::insert(&mut rows, user_id, new_token, new_expires_at);
        Ok(true)
    }

    async fn revoke_all(&self, user_id: i32) -> Result<u64, AuthError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|_, row| row.user_id != user_id);
        Ok((before - rows.len()) as u64)
    }

    async fn purge_expired(&self) -> Result<u64, AuthError> {
        let now = Utc::now();
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|_, row| !row.is_expired_at(now));
        Ok((before - rows.len()) as u64)
    }
}
