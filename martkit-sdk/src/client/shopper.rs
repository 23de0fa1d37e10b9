//! Shopper client: every endpoint behind the bearer token.
//!
//! Covers the cart, addresses, phone OTP, the payment handshake, and order
//! history.  One instance is built per authenticated session; the token it
//! holds never changes (a new login builds a new client).

use compact_str::CompactString;
use reqwest::{Client, RequestBuilder};
use url::Url;

use super::{ApiError, parse_response, send};
use crate::objects::Ack;
use crate::objects::address::{Address, AddressListResponse, AddressPayload};
use crate::objects::cart::{
    AddToCartRequest, CartEntry, CartResponse, RemoveFromCartRequest, UpdateQuantityRequest,
};
use crate::objects::order::{Order, OrderListResponse};
use crate::objects::otp::{SendOtpRequest, VerifyOtpRequest};
use crate::objects::payment::{
    CreateOrderRequest, CreateOrderResponse, VerifyPaymentRequest, VerifyPaymentResponse,
};

/// Typed HTTP client for the authenticated shopper endpoints.
#[derive(Debug, Clone)]
pub struct ShopperClient {
    http: Client,
    base_url: Url,
    token: CompactString,
}

impl ShopperClient {
    /// Create a new `ShopperClient`.
    ///
    /// * `base_url` – root URL of the storefront API.
    /// * `token` – the bearer token issued at login.
    pub fn new(base_url: Url, token: impl Into<CompactString>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            token: token.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    fn get(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.base_url.join(path)?;
        Ok(self.http.get(url).bearer_auth(&self.token))
    }

    fn post(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.base_url.join(path)?;
        Ok(self.http.post(url).bearer_auth(&self.token))
    }

    // -----------------------------------------------------------------
    // Cart
    // -----------------------------------------------------------------

    /// `GET /carts` – the authoritative cart for this session.
    pub async fn fetch_cart(&self) -> Result<Vec<CartEntry>, ApiError> {
        let resp = send(self.get("carts")?).await?;
        let cart: CartResponse = parse_response(resp).await?;
        Ok(cart.cart)
    }

    /// `POST /carts/add` – add a product (or bump its quantity).
    pub async fn add_to_cart(&self, req: &AddToCartRequest) -> Result<(), ApiError> {
        let resp = send(self.post("carts/add")?.json(req)).await?;
        parse_response::<Ack>(resp).await.map(|_| ())
    }

    /// `POST /carts/remove` – drop a product.  Removing an absent product is
    /// a server-side no-op.
    pub async fn remove_from_cart(&self, req: &RemoveFromCartRequest) -> Result<(), ApiError> {
        let resp = send(self.post("carts/remove")?.json(req)).await?;
        parse_response::<Ack>(resp).await.map(|_| ())
    }

    /// `POST /carts/update` – set the quantity of a product already in the
    /// cart.
    pub async fn update_quantity(&self, req: &UpdateQuantityRequest) -> Result<(), ApiError> {
        let resp = send(self.post("carts/update")?.json(req)).await?;
        parse_response::<Ack>(resp).await.map(|_| ())
    }

    /// `POST /carts/clear` – empty the server-side cart.
    pub async fn clear_cart(&self) -> Result<(), ApiError> {
        let resp = send(self.post("carts/clear")?.json(&serde_json::json!({}))).await?;
        parse_response::<Ack>(resp).await.map(|_| ())
    }

    // -----------------------------------------------------------------
    // Addresses
    // -----------------------------------------------------------------

    /// `GET /addresses` – list saved delivery addresses.
    pub async fn list_addresses(&self) -> Result<Vec<Address>, ApiError> {
        let resp = send(self.get("addresses")?).await?;
        let list: AddressListResponse = parse_response(resp).await?;
        Ok(list.into_addresses())
    }

    /// `POST /addresses` – save a new address.
    pub async fn create_address(&self, payload: &AddressPayload) -> Result<(), ApiError> {
        let resp = send(self.post("addresses")?.json(payload)).await?;
        parse_response::<Ack>(resp).await.map(|_| ())
    }

    /// `PUT /addresses/{id}` – update an existing address.
    pub async fn update_address(
        &self,
        id: &str,
        payload: &AddressPayload,
    ) -> Result<(), ApiError> {
        let url = self.base_url.join(&format!("addresses/{id}"))?;
        let resp = send(self.http.put(url).bearer_auth(&self.token).json(payload)).await?;
        parse_response::<Ack>(resp).await.map(|_| ())
    }

    /// `DELETE /addresses/{id}` – delete an address.
    pub async fn delete_address(&self, id: &str) -> Result<(), ApiError> {
        let url = self.base_url.join(&format!("addresses/{id}"))?;
        let resp = send(self.http.delete(url).bearer_auth(&self.token)).await?;
        parse_response::<Ack>(resp).await.map(|_| ())
    }

    // -----------------------------------------------------------------
    // Phone OTP
    // -----------------------------------------------------------------

    /// `POST /mobile-otp/send-otp` – dispatch a one-time code to a phone
    /// number.
    pub async fn send_otp(&self, req: &SendOtpRequest) -> Result<(), ApiError> {
        let resp = send(self.post("mobile-otp/send-otp")?.json(req)).await?;
        parse_response::<Ack>(resp).await.map(|_| ())
    }

    /// `POST /mobile-otp/verify-otp` – confirm a previously dispatched code.
    pub async fn verify_otp(&self, req: &VerifyOtpRequest) -> Result<(), ApiError> {
        let resp = send(self.post("mobile-otp/verify-otp")?.json(req)).await?;
        parse_response::<Ack>(resp).await.map(|_| ())
    }

    // -----------------------------------------------------------------
    // Payments
    // -----------------------------------------------------------------

    /// `POST /payments/create-order` – create a gateway order for the cart.
    pub async fn create_payment_order(
        &self,
        req: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ApiError> {
        let resp = send(self.post("payments/create-order")?.json(req)).await?;
        parse_response(resp).await
    }

    /// `POST /payments/verify` – verify the gateway's signed callback.  Only
    /// a success here proves the charge.
    pub async fn verify_payment(
        &self,
        req: &VerifyPaymentRequest,
    ) -> Result<VerifyPaymentResponse, ApiError> {
        let resp = send(self.post("payments/verify")?.json(req)).await?;
        parse_response(resp).await
    }

    // -----------------------------------------------------------------
    // Orders
    // -----------------------------------------------------------------

    /// `GET /orders` – the shopper's order history, newest first.
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let resp = send(self.get("orders")?).await?;
        let list: OrderListResponse = parse_response(resp).await?;
        Ok(list.orders)
    }
}
