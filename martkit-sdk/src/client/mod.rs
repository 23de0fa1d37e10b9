//! HTTP clients for the storefront API.
//!
//! One client per API audience:
//!
//! - [`CatalogClient`] – public catalog endpoints, no credentials.
//! - [`AuthClient`] – registration and login, plus the token-bearing
//!   profile endpoints.
//! - [`ShopperClient`] – everything behind the bearer token: cart,
//!   addresses, OTP, payments, order history.

mod auth;
mod catalog;
mod shopper;

pub use auth::AuthClient;
pub use catalog::CatalogClient;
pub use shopper::ShopperClient;

use compact_str::CompactString;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

/// Errors produced by the SDK HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The bearer token was missing, invalid, or expired (HTTP 401).
    #[error("authentication expired")]
    Unauthorized,

    /// The server returned a failure status code.
    #[error("api error: status {status}, message: {message}")]
    Api {
        status: StatusCode,
        message: CompactString,
    },

    /// A 2xx response whose envelope carried `success: false`.
    #[error("request rejected: {0}")]
    Rejected(CompactString),

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// The server-provided message, when one exists.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } | Self::Rejected(message) => Some(message),
            _ => None,
        }
    }
}

const GENERIC_FAILURE: &str = "request failed";

/// Send a request, retrying exactly once if the transport times out.
///
/// A single automatic retry on timeout, nothing more; every other failure
/// surfaces immediately.
pub(crate) async fn send(builder: RequestBuilder) -> Result<Response, ApiError> {
    let retry = builder.try_clone();
    match builder.send().await {
        Ok(resp) => Ok(resp),
        Err(err) if err.is_timeout() => match retry {
            Some(second) => {
                tracing::debug!("request timed out, retrying once");
                Ok(second.send().await?)
            }
            None => Err(err.into()),
        },
        Err(err) => Err(err.into()),
    }
}

/// Unwrap the `{ success, message, ... }` envelope around a response body.
///
/// - 401 maps to [`ApiError::Unauthorized`] regardless of body.
/// - Other failure statuses surface the server `message` when the body
///   carries one, else a generic fallback.
/// - A 2xx body with `success: false` is [`ApiError::Rejected`].
pub(crate) async fn parse_response<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    decode_envelope(status, &bytes)
}

fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ApiError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }

    let value: serde_json::Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        // Non-JSON error pages (proxies, crashes) still need a typed error.
        Err(err) if !status.is_success() => {
            tracing::debug!("unparseable error body: {err}");
            return Err(ApiError::Api {
                status,
                message: CompactString::const_new(GENERIC_FAILURE),
            });
        }
        Err(err) => return Err(err.into()),
    };

    let message = value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .unwrap_or(GENERIC_FAILURE);

    if !status.is_success() {
        return Err(ApiError::Api {
            status,
            message: message.into(),
        });
    }

    let success = value
        .get("success")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(true);
    if !success {
        return Err(ApiError::Rejected(message.into()));
    }

    serde_json::from_value(value).map_err(ApiError::Json)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::objects::Ack;
    use crate::objects::cart::CartResponse;

    #[test]
    fn test_success_envelope_unwraps_payload() {
        let body = br#"{
            "success": true,
            "cart": [
                { "productId": { "_id": "p1", "name": "Rice", "price": 100 }, "quantity": 2 }
            ]
        }"#;
        let resp: CartResponse = decode_envelope(StatusCode::OK, body).unwrap();
        assert_eq!(resp.cart.len(), 1);
        assert_eq!(resp.cart[0].product.id, "p1");
        assert_eq!(resp.cart[0].quantity, 2);
    }

    #[test]
    fn test_rejected_envelope_carries_server_message() {
        let body = br#"{ "success": false, "message": "product out of stock" }"#;
        let err = decode_envelope::<Ack>(StatusCode::OK, body).unwrap_err();
        match err {
            ApiError::Rejected(message) => assert_eq!(message, "product out of stock"),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_401_is_unauthorized_regardless_of_body() {
        let err = decode_envelope::<Ack>(StatusCode::UNAUTHORIZED, b"not even json").unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_error_status_uses_message_field() {
        let body = br#"{ "success": false, "message": "cart item not found" }"#;
        let err = decode_envelope::<Ack>(StatusCode::NOT_FOUND, body).unwrap_err();
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(message, "cart item not found");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn test_error_status_with_garbage_body_falls_back() {
        let err =
            decode_envelope::<Ack>(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>")
                .unwrap_err();
        match err {
            ApiError::Api { message, .. } => assert_eq!(message, GENERIC_FAILURE),
            other => panic!("expected Api, got {other:?}"),
        }
    }
}
