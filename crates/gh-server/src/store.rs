//! In-memory token store
//!
//! Holds one GitHub access token per user id and the logins that are
//! waiting for their OAuth callback. Nothing survives a restart.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// Lifetime of a login that has not reached `/callback`
pub const DEFAULT_LOGIN_TTL_SECS: i64 = 600;

/// A `/login` that has not reached `/callback` yet
#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl PendingLogin {
    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at > ttl
    }
}

/// Shared token store; cloning shares the underlying maps
#[derive(Debug, Clone)]
pub struct TokenStore {
    tokens: Arc<DashMap<String, String>>,
    pending: Arc<DashMap<String, PendingLogin>>,
    login_ttl: Duration,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_LOGIN_TTL_SECS))
    }
}

impl TokenStore {
    pub fn new(login_ttl: Duration) -> Self {
        Self {
            tokens: Arc::new(DashMap::new()),
            pending: Arc::new(DashMap::new()),
            login_ttl,
        }
    }

    /// Store whose pending logins live `secs` seconds.
    ///
    /// Values chrono cannot represent fall back to the default lifetime.
    pub fn with_login_ttl_secs(secs: u64) -> Self {
        let ttl = i64::try_from(secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| {
                warn!(
                    "login_ttl_secs {} is out of range, using {}",
                    secs, DEFAULT_LOGIN_TTL_SECS
                );
                Duration::seconds(DEFAULT_LOGIN_TTL_SECS)
            });
        Self::new(ttl)
    }

    pub fn login_ttl(&self) -> Duration {
        self.login_ttl
    }

    pub fn token(&self, user_id: &str) -> Option<String> {
        self.tokens.get(user_id).map(|t| t.value().clone())
    }

    pub fn is_logged_in(&self, user_id: &str) -> bool {
        self.tokens.contains_key(user_id)
    }

    /// Store `token` for `user_id`, replacing any previous one
    pub fn insert_token(&self, user_id: &str, token: impl Into<String>) {
        self.tokens.insert(user_id.to_string(), token.into());
    }

    /// Returns whether a token was stored
    pub fn remove_token(&self, user_id: &str) -> bool {
        self.tokens.remove(user_id).is_some()
    }

    /// Start a login for `user_id` and return the OAuth `state` nonce
    pub fn begin_login(&self, user_id: &str) -> String {
        self.begin_login_at(user_id, Utc::now())
    }

    pub(crate) fn begin_login_at(&self, user_id: &str, now: DateTime<Utc>) -> String {
        self.sweep_expired(Utc::now());

        let nonce = Uuid::new_v4().simple().to_string();
        self.pending.insert(
            nonce.clone(),
            PendingLogin {
                user_id: user_id.to_string(),
                created_at: now,
            },
        );
        debug!("Pending login for '{}' ({} pending)", user_id, self.pending.len());
        nonce
    }

    /// Consume `state` and return the user id it was issued for.
    ///
    /// Unknown and expired states yield `None`; either way the state cannot
    /// be used again.
    pub fn complete_login(&self, state: &str) -> Option<String> {
        let now = Utc::now();
        let pending = self.pending.remove(state).map(|(_, p)| p);
        self.sweep_expired(now);

        let pending = pending?;
        if pending.is_expired(now, self.login_ttl) {
            debug!("Login state for '{}' expired", pending.user_id);
            return None;
        }
        Some(pending.user_id)
    }

    pub fn pending_logins(&self) -> usize {
        self.pending.len()
    }

    /// Drop abandoned logins
    fn sweep_expired(&self, now: DateTime<Utc>) {
        let ttl = self.login_ttl;
        self.pending.retain(|_, p| !p.is_expired(now, ttl));
    }
}
