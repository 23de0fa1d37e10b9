//! Public catalog client (no credentials).

use reqwest::Client;
use url::Url;

use super::{ApiError, parse_response, send};
use crate::objects::catalog::{
    CategoryListResponse, CategoryResponse, FeaturedResponse, Product, ProductPage,
    ProductQuery, ProductResponse,
};

/// Typed HTTP client for the public catalog endpoints.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: Url,
}

impl CatalogClient {
    /// Create a new `CatalogClient`.
    ///
    /// * `base_url` – root URL of the storefront API
    ///   (e.g. `https://shop.example.com/api/`).
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /categories` – list all active categories.
    pub async fn list_categories(&self) -> Result<CategoryListResponse, ApiError> {
        let url = self.base_url.join("categories")?;
        let resp = send(self.http.get(url)).await?;
        parse_response(resp).await
    }

    /// `GET /categories/{slug}` – fetch a category by slug.
    pub async fn get_category(&self, slug: &str) -> Result<CategoryResponse, ApiError> {
        let url = self.base_url.join(&format!("categories/{slug}"))?;
        let resp = send(self.http.get(url)).await?;
        parse_response(resp).await
    }

    /// `GET /products` – paginated product listing with optional search and
    /// category filters.
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let url = self.base_url.join("products")?;
        let resp = send(self.http.get(url).query(query)).await?;
        parse_response(resp).await
    }

    /// `GET /products/featured` – the curated featured set.
    pub async fn featured_products(&self) -> Result<Vec<Product>, ApiError> {
        let url = self.base_url.join("products/featured")?;
        let resp = send(self.http.get(url)).await?;
        let featured: FeaturedResponse = parse_response(resp).await?;
        Ok(featured.products)
    }

    /// `GET /products/{id_or_slug}` – fetch a single product.
    pub async fn get_product(&self, id_or_slug: &str) -> Result<ProductResponse, ApiError> {
        let url = self.base_url.join(&format!("products/{id_or_slug}"))?;
        let resp = send(self.http.get(url)).await?;
        parse_response(resp).await
    }

    /// `GET /products/search` – full-text product search.
    pub async fn search_products(
        &self,
        query: &str,
        page: u32,
        limit: u32,
    ) -> Result<ProductPage, ApiError> {
        let url = self.base_url.join("products/search")?;
        let resp = send(
            self.http
                .get(url)
                .query(&[("query", query)])
                .query(&[("page", page), ("limit", limit)]),
        )
        .await?;
        parse_response(resp).await
    }
}
