//! Auth session holder.
//!
//! Owns the signed-in user and the persisted bearer token.  The user is
//! published over a `watch` channel so the other services can gate their
//! operations on authentication without holding a reference to the session.

use async_trait::async_trait;
use compact_str::CompactString;
use martkit_sdk::client::{ApiError, AuthClient};
use martkit_sdk::objects::auth::{
    AuthResponse, LoginRequest, RegisterRequest, ResetPasswordRequest, User,
};
use tokio::sync::{RwLock, watch};

use crate::error::StoreError;

/// Persistence for the opaque session token.
///
/// The mobile app keeps it in platform key-value storage; the CLI keeps it
/// in a file.  Storage failures are logged and swallowed: a lost token just
/// means the next protected call redirects to login.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self) -> Option<CompactString>;
    async fn set(&self, token: &str);
    async fn clear(&self);
}

/// In-memory token store for tests and short-lived sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: RwLock<Option<CompactString>>,
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> Option<CompactString> {
        self.inner.read().await.clone()
    }

    async fn set(&self, token: &str) {
        *self.inner.write().await = Some(CompactString::from(token));
    }

    async fn clear(&self) {
        *self.inner.write().await = None;
    }
}

/// The auth endpoints the session holder needs.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, req: &RegisterRequest) -> Result<(), ApiError>;
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError>;
    async fn me(&self, token: &str) -> Result<User, ApiError>;
    async fn reset_password(
        &self,
        token: &str,
        req: &ResetPasswordRequest,
    ) -> Result<(), ApiError>;
}

#[async_trait]
impl AuthApi for AuthClient {
    async fn register(&self, req: &RegisterRequest) -> Result<(), ApiError> {
        AuthClient::register(self, req).await
    }

    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        AuthClient::login(self, req).await
    }

    async fn me(&self, token: &str) -> Result<User, ApiError> {
        AuthClient::me(self, token).await
    }

    async fn reset_password(
        &self,
        token: &str,
        req: &ResetPasswordRequest,
    ) -> Result<(), ApiError> {
        AuthClient::reset_password(self, token, req).await
    }
}

/// Published session state.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    /// True while an auth network call is in flight.
    pub loading: bool,
}

/// Holds the current authenticated user and bearer token for one app
/// session.
pub struct AuthSession<A, S> {
    api: A,
    tokens: S,
    state: watch::Sender<SessionSnapshot>,
}

impl<A: AuthApi, S: TokenStore> AuthSession<A, S> {
    pub fn new(api: A, tokens: S) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self { api, tokens, state }
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Current snapshot (user + loading flag).
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Subscribe to session changes.  The cart service resets itself on
    /// login/logout through this channel.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// The stored bearer token, for building a `ShopperClient`.
    pub async fn token(&self) -> Option<CompactString> {
        self.tokens.get().await
    }

    /// Restore the session from a persisted token, if one exists.
    ///
    /// No token is not an error: the app simply starts signed out.  An
    /// expired token is dropped and surfaced as [`StoreError::AuthExpired`]
    /// so the caller redirects to login.
    pub async fn load_user(&self) -> Result<Option<User>, StoreError> {
        let Some(token) = self.tokens.get().await else {
            tracing::debug!("no stored token, starting signed out");
            return Ok(None);
        };

        let _loading = LoadingGuard::engage(&self.state);
        match self.api.me(&token).await {
            Ok(user) => {
                self.publish_user(Some(user.clone()));
                Ok(Some(user))
            }
            Err(ApiError::Unauthorized) => {
                tracing::info!("stored token rejected, clearing it");
                self.tokens.clear().await;
                self.publish_user(None);
                Err(StoreError::AuthExpired)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Create an account.  The backend mails a verification link; no token
    /// is issued and nobody is signed in yet.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), StoreError> {
        let _loading = LoadingGuard::engage(&self.state);
        let req = RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: password.to_owned(),
        };
        self.api.register(&req).await?;
        tracing::info!(email, "registration submitted, verification email sent");
        Ok(())
    }

    /// Sign in.  Persists the token and publishes the user; a failed login
    /// leaves prior state untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, StoreError> {
        let _loading = LoadingGuard::engage(&self.state);
        let req = LoginRequest {
            email: email.into(),
            password: password.to_owned(),
        };
        let resp = self.api.login(&req).await?;
        self.tokens.set(&resp.token).await;
        self.publish_user(Some(resp.user.clone()));
        tracing::info!(user = %resp.user.email, "signed in");
        Ok(resp.user)
    }

    /// Sign out: drop the token and the user together.
    pub async fn logout(&self) {
        self.tokens.clear().await;
        self.publish_user(None);
        tracing::info!("signed out");
    }

    /// Drop the session after any protected call reported an expired
    /// token.  The stale token must not survive for the next launch to
    /// trip over.
    pub async fn expire(&self) {
        self.tokens.clear().await;
        self.publish_user(None);
        tracing::info!("session expired, stored token dropped");
    }

    /// Change the password of the signed-in user.
    pub async fn update_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), StoreError> {
        let Some(token) = self.tokens.get().await else {
            return Err(StoreError::AuthExpired);
        };

        let _loading = LoadingGuard::engage(&self.state);
        let req = ResetPasswordRequest {
            old_password: old_password.to_owned(),
            new_password: new_password.to_owned(),
        };
        match self.api.reset_password(&token, &req).await {
            Ok(()) => Ok(()),
            Err(ApiError::Unauthorized) => {
                self.tokens.clear().await;
                self.publish_user(None);
                Err(StoreError::AuthExpired)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn publish_user(&self, user: Option<User>) {
        self.state.send_modify(|s| s.user = user);
    }
}

/// Sets the loading flag on construction and always drops it, success or
/// failure.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<SessionSnapshot>,
}

impl<'a> LoadingGuard<'a> {
    fn engage(state: &'a watch::Sender<SessionSnapshot>) -> Self {
        state.send_modify(|s| s.loading = true);
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.loading = false);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FakeAuthApi {
        accept: AtomicBool,
    }

    impl FakeAuthApi {
        fn new() -> Self {
            Self {
                accept: AtomicBool::new(true),
            }
        }

        fn reject(&self) {
            self.accept.store(false, Ordering::SeqCst);
        }

        fn user() -> User {
            User {
                id: "u1".into(),
                name: "Asha".into(),
                email: "asha@example.com".into(),
            }
        }
    }

    #[async_trait]
    impl AuthApi for &FakeAuthApi {
        async fn register(&self, _req: &RegisterRequest) -> Result<(), ApiError> {
            Ok(())
        }

        async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
            if self.accept.load(Ordering::SeqCst) {
                Ok(AuthResponse {
                    token: "tok-1".into(),
                    user: FakeAuthApi::user(),
                })
            } else {
                Err(ApiError::Rejected(format!("bad password for {}", req.email).into()))
            }
        }

        async fn me(&self, token: &str) -> Result<User, ApiError> {
            if self.accept.load(Ordering::SeqCst) && token == "tok-1" {
                Ok(FakeAuthApi::user())
            } else {
                Err(ApiError::Unauthorized)
            }
        }

        async fn reset_password(
            &self,
            _token: &str,
            _req: &ResetPasswordRequest,
        ) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_login_persists_token_and_publishes_user() {
        let api = FakeAuthApi::new();
        let session = AuthSession::new(&api, MemoryTokenStore::default());

        let user = session.login("asha@example.com", "pw").await.unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(session.token().await.as_deref(), Some("tok-1"));
        assert!(session.user().is_some());
        assert!(!session.snapshot().loading);
    }

    #[tokio::test]
    async fn test_failed_login_leaves_state_untouched() {
        let api = FakeAuthApi::new();
        let session = AuthSession::new(&api, MemoryTokenStore::default());
        api.reject();

        let err = session.login("asha@example.com", "nope").await.unwrap_err();
        assert!(matches!(err, StoreError::Server(_)));
        assert!(session.token().await.is_none());
        assert!(session.user().is_none());
        assert!(!session.snapshot().loading);
    }

    #[tokio::test]
    async fn test_rejected_token_is_cleared_on_load() {
        let api = FakeAuthApi::new();
        let store = MemoryTokenStore::default();
        store.set("stale-token").await;
        let session = AuthSession::new(&api, store);

        let err = session.load_user().await.unwrap_err();
        assert!(matches!(err, StoreError::AuthExpired));
        assert!(session.token().await.is_none());
        assert!(session.user().is_none());
    }

    #[tokio::test]
    async fn test_load_user_without_token_is_silent() {
        let api = FakeAuthApi::new();
        let session = AuthSession::new(&api, MemoryTokenStore::default());

        assert!(session.load_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_drops_stored_token() {
        let api = FakeAuthApi::new();
        let session = AuthSession::new(&api, MemoryTokenStore::default());
        session.login("asha@example.com", "pw").await.unwrap();

        // A cart or address call came back 401 mid-session.
        session.expire().await;
        assert!(session.token().await.is_none());
        assert!(session.user().is_none());
    }

    #[tokio::test]
    async fn test_logout_drops_token_and_user() {
        let api = FakeAuthApi::new();
        let session = AuthSession::new(&api, MemoryTokenStore::default());
        session.login("asha@example.com", "pw").await.unwrap();

        session.logout().await;
        assert!(session.token().await.is_none());
        assert!(session.user().is_none());
    }
}
