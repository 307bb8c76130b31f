//! Authenticated session: who is signed in and with which bearer token.

use std::sync::Arc;

use tokio::sync::watch;

use crate::db::TokenStore;
use crate::errors::{AppError, AppResult};
use crate::jwt;
use crate::models::user::User;

/// Storage key of the bearer token.
pub const AUTH_TOKEN_KEY: &str = "_auth";
/// Storage key of the serialized session user.
pub const AUTH_STATE_KEY: &str = "_auth_state";

/// Holds the session subject and persists its token.
///
/// Cloning is cheap and every clone observes the same session.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn TokenStore>,
    subject: Arc<watch::Sender<Option<User>>>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let (subject, _) = watch::channel(None);
        Self {
            store,
            subject: Arc::new(subject),
        }
    }

    /// The underlying key-value store, shared with the remote client.
    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.store)
    }

    /// Reloads the subject persisted by an earlier process.
    ///
    /// Nothing is restored when the token is missing or expired.
    pub async fn restore(&self) -> AppResult<Option<User>> {
        let Some(token) = self.store.get(AUTH_TOKEN_KEY).await? else {
            return Ok(None);
        };
        if token.is_empty() {
            return Ok(None);
        }
        if !jwt::inspect(&token).is_usable() {
            tracing::info!("persisted session token has expired");
            return Ok(None);
        }

        let Some(raw) = self.store.get(AUTH_STATE_KEY).await? else {
            return Ok(None);
        };
        let user = match serde_json::from_str::<User>(&raw) {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable session state");
                return Ok(None);
            }
        };

        tracing::info!(user_id = %user.id, "session restored");
        self.subject.send_replace(Some(user.clone()));
        Ok(Some(user))
    }

    /// Persists `token` and makes `user` the session subject.
    ///
    /// An empty or expired token is rejected before anything is written, so
    /// a successful return always leaves the session authenticated.
    pub async fn sign_in(&self, token: &str, user: User) -> AppResult<()> {
        if token.is_empty() {
            return Err(AppError::token("server returned an empty access token"));
        }
        if !jwt::inspect(token).is_usable() {
            return Err(AppError::token("server returned an expired access token"));
        }

        let state = serde_json::to_string(&user)
            .map_err(|err| AppError::internal(format!("failed to encode session user: {err}")))?;

        self.store.set(AUTH_TOKEN_KEY, token).await?;
        self.store.set(AUTH_STATE_KEY, &state).await?;

        tracing::info!(user_id = %user.id, role = ?user.role, "signed in");
        self.subject.send_replace(Some(user));
        Ok(())
    }

    /// Clears the persisted token and subject.
    ///
    /// Returns `false` when there was no session to clear. Navigation is up
    /// to the caller.
    pub async fn sign_out(&self) -> AppResult<bool> {
        let had_token = self.store.get(AUTH_TOKEN_KEY).await?.is_some();
        let had_subject = self.subject.borrow().is_some();
        if !had_token && !had_subject {
            return Ok(false);
        }

        self.store.remove(AUTH_TOKEN_KEY).await?;
        self.store.remove(AUTH_STATE_KEY).await?;
        self.subject.send_replace(None);

        tracing::info!("signed out");
        Ok(true)
    }

    /// Whether a usable token is persisted. No network round trip.
    pub async fn is_authenticated(&self) -> bool {
        match self.store.get(AUTH_TOKEN_KEY).await {
            Ok(Some(token)) => !token.is_empty() && jwt::inspect(&token).is_usable(),
            Ok(None) => false,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read session token");
                false
            }
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.subject.borrow().clone()
    }

    pub async fn token(&self) -> AppResult<Option<String>> {
        self.store.get(AUTH_TOKEN_KEY).await
    }

    /// Receiver notified on every sign-in and sign-out.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.subject.subscribe()
    }
}
