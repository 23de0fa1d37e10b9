//! Payment API types for the create → collect → verify handshake.
//!
//! The backend creates a gateway order, the external payment SDK collects the
//! charge against it, and the signed result is sent back to the backend for
//! signature verification.  The client never treats the SDK's success
//! callback alone as proof of payment.

use compact_str::CompactString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One cart line at order-creation time: product id, quantity, and the
/// effective unit price the client displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product: CompactString,
    pub quantity: u32,
    pub price: Decimal,
}

/// Request body for `POST /payments/create-order`.
///
/// `total_price` is the client-computed total rounded to a whole currency
/// unit.  It is advisory only; the backend recomputes and is the sole
/// authority for the settlement amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub total_price: i64,
    pub products: Vec<OrderLine>,
    pub address_id: CompactString,
}

/// Response body of `POST /payments/create-order`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    /// Internal order id; echoed back at verification time.
    pub order_id: CompactString,
    /// The payment-provider order the SDK charges against.
    pub gateway_order_id: CompactString,
    /// Authoritative amount in minor currency units.  This figure, not the
    /// client-computed total, is what the payment SDK is opened with.
    pub amount: i64,
}

/// Request body for `POST /payments/verify`: the gateway's signed callback
/// identifiers plus the internal order id they belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub gateway_order_id: CompactString,
    pub gateway_payment_id: CompactString,
    pub gateway_signature: CompactString,
    pub order_id: CompactString,
}

/// Response body of `POST /payments/verify`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentResponse {
    #[serde(default)]
    pub message: Option<CompactString>,
}
