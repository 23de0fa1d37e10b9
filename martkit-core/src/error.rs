//! Error taxonomy for the session services.
//!
//! Client-side validation failures never reach the network.  Network and
//! server failures are kept distinct so the UI can word them differently,
//! and the two payment-flow failure classes are separated from everything
//! else because they tell the shopper whether money was plausibly charged.

use compact_str::CompactString;
use martkit_sdk::client::ApiError;

/// Errors surfaced by the session services.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Rejected client-side before any request was issued.
    #[error("{0}")]
    Validation(CompactString),

    /// The request never reached the server.
    #[error("network error, check your connection")]
    Network,

    /// The server reported a failure; carries its message when present.
    #[error("{0}")]
    Server(CompactString),

    /// The bearer token is gone or expired.  The caller drops the stored
    /// token via the session holder and redirects to login.
    #[error("session expired, please sign in again")]
    AuthExpired,

    /// Payment-order creation or collection failed.  The cart is intact and
    /// checkout can be retried.
    #[error(transparent)]
    Payment(#[from] PaymentFailure),

    /// The gateway reported success but the backend's signature check did
    /// not confirm the charge.  The cart is intact; the shopper may have
    /// been charged and should contact support.
    #[error("payment verification failed")]
    Verification,
}

/// The non-verification payment failure classes, one per phase.
#[derive(Debug, thiserror::Error)]
pub enum PaymentFailure {
    /// The backend refused to create a gateway order.
    #[error("could not create payment order: {0}")]
    Creation(CompactString),

    /// The shopper dismissed the payment UI.
    #[error("payment cancelled")]
    Cancelled,

    /// The payment UI reported a failed charge attempt.
    #[error("payment failed: {0}")]
    Collection(CompactString),
}

impl StoreError {
    pub(crate) fn validation(msg: impl Into<CompactString>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<ApiError> for StoreError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http(_) => Self::Network,
            ApiError::Unauthorized => Self::AuthExpired,
            ApiError::Api { message, .. } | ApiError::Rejected(message) => Self::Server(message),
            ApiError::Json(_) | ApiError::Url(_) => {
                Self::Server(CompactString::const_new("unexpected server response"))
            }
        }
    }
}
