//! Order history API types.

use compact_str::CompactString;
use rust_decimal::Decimal;
use serde::Deserialize;
use time::OffsetDateTime;

/// Fulfilment status of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
}

/// One line of a placed order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItem {
    pub name: CompactString,
    pub quantity: u32,
    pub price: Decimal,
}

/// A placed order as returned by `GET /orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: CompactString,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Response body of `GET /orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
}
