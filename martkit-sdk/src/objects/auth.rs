//! Auth API request and response types.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A signed-in storefront user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: CompactString,
    pub name: CompactString,
    pub email: CompactString,
}

/// Request body for `POST /auth/register`.
///
/// Registration does not sign the user in; the backend sends a verification
/// email and the account must be confirmed before the first login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: CompactString,
    pub email: CompactString,
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: CompactString,
    pub password: String,
}

/// Response returned on successful login: the bearer token plus the user
/// profile it belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: CompactString,
    pub user: User,
}

/// Response body of `GET /auth/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    pub user: User,
}

/// Request body for `POST /auth/reset-password` (authenticated).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub old_password: String,
    pub new_password: String,
}
