//! Auth client: registration, login, profile, password reset.
//!
//! Registration and login are anonymous; the profile and password endpoints
//! take the bearer token issued at login.  Token storage is the caller's
//! concern (see `martkit-core`'s `TokenStore`).

use reqwest::Client;
use url::Url;

use super::{ApiError, parse_response, send};
use crate::objects::Ack;
use crate::objects::auth::{
    AuthResponse, LoginRequest, MeResponse, RegisterRequest, ResetPasswordRequest, User,
};

/// Typed HTTP client for the auth endpoints.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: Client,
    base_url: Url,
}

impl AuthClient {
    /// Create a new `AuthClient` rooted at the API base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `POST /auth/register` – create an account.  The backend sends a
    /// verification email; no token is issued here.
    pub async fn register(&self, req: &RegisterRequest) -> Result<(), ApiError> {
        let url = self.base_url.join("auth/register")?;
        let resp = send(self.http.post(url).json(req)).await?;
        parse_response::<Ack>(resp).await.map(|_| ())
    }

    /// `POST /auth/login` – exchange credentials for a bearer token.
    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let url = self.base_url.join("auth/login")?;
        let resp = send(self.http.post(url).json(req)).await?;
        parse_response(resp).await
    }

    /// `GET /auth/me` – fetch the profile behind a token.
    pub async fn me(&self, token: &str) -> Result<User, ApiError> {
        let url = self.base_url.join("auth/me")?;
        let resp = send(self.http.get(url).bearer_auth(token)).await?;
        let me: MeResponse = parse_response(resp).await?;
        Ok(me.user)
    }

    /// `POST /auth/reset-password` – change the password of the signed-in
    /// user.
    pub async fn reset_password(
        &self,
        token: &str,
        req: &ResetPasswordRequest,
    ) -> Result<(), ApiError> {
        let url = self.base_url.join("auth/reset-password")?;
        let resp = send(self.http.post(url).bearer_auth(token).json(req)).await?;
        parse_response::<Ack>(resp).await.map(|_| ())
    }
}
