//! Cart API types.
//!
//! `GET /carts` returns entries with the product document populated inline
//! (`productId` is the full product, not just its id).  Mutation endpoints
//! take the bare product id and acknowledge with the plain envelope; callers
//! are expected to refetch the cart afterwards.

use compact_str::CompactString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A selected product variant on a cart entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    #[serde(default)]
    pub size: Option<CompactString>,
    #[serde(default)]
    pub color: Option<CompactString>,
    #[serde(default)]
    pub additional_price: Option<Decimal>,
    #[serde(default)]
    pub stock: Option<u32>,
}

/// The populated product document embedded in a cart entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
    #[serde(rename = "_id")]
    pub id: CompactString,
    pub name: CompactString,
    pub price: Decimal,
    #[serde(default)]
    pub discount_price: Option<Decimal>,
    /// Newer product documents carry `images`; legacy ones a single `image`.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl CartProduct {
    /// Display image: first of `images`, falling back to the legacy field.
    pub fn display_image(&self) -> Option<&str> {
        self.images
            .first()
            .map(String::as_str)
            .or(self.image.as_deref())
    }
}

/// One server-side cart row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    #[serde(rename = "productId")]
    pub product: CartProduct,
    pub quantity: u32,
    #[serde(default)]
    pub variant: Option<Variant>,
}

/// Response body of `GET /carts`.
#[derive(Debug, Clone, Deserialize)]
pub struct CartResponse {
    pub cart: Vec<CartEntry>,
}

/// Request body for `POST /carts/add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: CompactString,
    pub quantity: u32,
}

/// Request body for `POST /carts/remove`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub product_id: CompactString,
}

/// Request body for `POST /carts/update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    pub product_id: CompactString,
    pub quantity: u32,
}
