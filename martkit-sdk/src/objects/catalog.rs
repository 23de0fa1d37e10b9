//! Catalog (category and product) API types.

use compact_str::CompactString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product category.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CompactString,
    pub name: CompactString,
    pub slug: CompactString,
    #[serde(default)]
    pub image: Option<String>,
}

/// A catalog product as returned by the product endpoints.
///
/// `discount_price` is only meaningful when strictly below `price`; the
/// pricing rules live client-side in `martkit-core::pricing`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: CompactString,
    pub name: CompactString,
    #[serde(default)]
    pub slug: Option<CompactString>,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub discount_price: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: Option<CompactString>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub stock: Option<u32>,
}

/// Query parameters for the paginated product listing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CompactString>,
}

/// One page of products.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// Response body of the category listing.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryListResponse {
    pub categories: Vec<Category>,
}

/// Response body of the single-category endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryResponse {
    pub category: Category,
}

/// Response body of the single-product endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductResponse {
    pub product: Product,
}

/// Response body of the featured-products endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FeaturedResponse {
    pub products: Vec<Product>,
}
