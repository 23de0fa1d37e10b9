//! Checkout: the create → collect → verify payment handshake.
//!
//! The one correctness property that matters here: the cart is never
//! cleared, and no order is ever treated as paid, without an explicit
//! server-side signature check.  The payment UI's success callback is not
//! proof of a valid charge, so the flow must stay three-phase.
//!
//! Every failure class is distinct so the shopper can be told whether
//! their money was plausibly charged: order creation failed (nothing
//! charged), collection cancelled/failed (nothing charged), verification
//! failed (possibly charged, contact support).  All of them leave the cart
//! intact for a retry.

use async_trait::async_trait;
use compact_str::CompactString;
use rust_decimal::prelude::ToPrimitive;

use martkit_sdk::client::{ApiError, ShopperClient};
use martkit_sdk::objects::address::Address;
use martkit_sdk::objects::auth::User;
use martkit_sdk::objects::payment::{
    CreateOrderRequest, CreateOrderResponse, OrderLine, VerifyPaymentRequest,
    VerifyPaymentResponse,
};

use crate::cart::{CartApi, CartService};
use crate::error::{PaymentFailure, StoreError};
use crate::pricing;

/// The payment endpoints the flow needs.
#[async_trait]
pub trait PaymentApi: Send + Sync {
    async fn create_payment_order(
        &self,
        req: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ApiError>;
    async fn verify_payment(
        &self,
        req: &VerifyPaymentRequest,
    ) -> Result<VerifyPaymentResponse, ApiError>;
}

#[async_trait]
impl PaymentApi for ShopperClient {
    async fn create_payment_order(
        &self,
        req: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ApiError> {
        ShopperClient::create_payment_order(self, req).await
    }

    async fn verify_payment(
        &self,
        req: &VerifyPaymentRequest,
    ) -> Result<VerifyPaymentResponse, ApiError> {
        ShopperClient::verify_payment(self, req).await
    }
}

/// What the external payment UI is opened with.
#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub gateway_order_id: CompactString,
    /// Server-returned amount in minor currency units.  The only figure
    /// ever handed to the payment UI; the client total is display-only.
    pub amount_minor: i64,
}

/// Contact details prefilled into the payment UI.
#[derive(Debug, Clone)]
pub struct ContactPrefill {
    pub name: CompactString,
    pub phone: CompactString,
    pub email: CompactString,
}

/// The gateway's signed success callback.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub gateway_order_id: CompactString,
    pub gateway_payment_id: CompactString,
    pub gateway_signature: CompactString,
}

/// Outcomes of the external payment UI short of a signed success.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("dismissed by the shopper")]
    Cancelled,
    #[error("{0}")]
    Failed(CompactString),
}

/// The external payment-collection UI (the gateway's mobile SDK in the app,
/// a prompt in the CLI, a scripted fake in tests).
#[async_trait]
pub trait PaymentCollector: Send + Sync {
    async fn collect(
        &self,
        order: &GatewayOrder,
        prefill: &ContactPrefill,
    ) -> Result<PaymentReceipt, CollectError>;
}

/// A successfully placed and verified order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: CompactString,
}

/// Drives the payment handshake for one session.
pub struct CheckoutService<P, C> {
    payments: P,
    collector: C,
}

impl<P: PaymentApi, C: PaymentCollector> CheckoutService<P, C> {
    pub fn new(payments: P, collector: C) -> Self {
        Self { payments, collector }
    }

    /// Run the full handshake against the current cart snapshot.
    ///
    /// Fails fast with no network call when the cart is empty or no address
    /// is selected.  The cart is cleared only after the backend confirms
    /// the payment signature; every other outcome leaves it untouched.
    pub async fn place_order<A: CartApi>(
        &self,
        cart: &CartService<A>,
        address: Option<&Address>,
        user: &User,
    ) -> Result<PlacedOrder, StoreError> {
        let address =
            address.ok_or_else(|| StoreError::validation("select a delivery address"))?;
        let snapshot = cart.snapshot();
        if snapshot.items.is_empty() {
            return Err(StoreError::validation("your cart is empty"));
        }

        // Phase 1: create the gateway order.  The client total is advisory;
        // the backend recomputes and returns the settlement amount.
        let totals = pricing::totals(&snapshot.items);
        let total_price = totals
            .total
            .round()
            .to_i64()
            .ok_or_else(|| StoreError::validation("order total out of range"))?;
        let lines: Vec<OrderLine> = snapshot
            .items
            .iter()
            .map(|item| OrderLine {
                product: item.product_id.clone(),
                quantity: item.quantity,
                price: pricing::effective_price(item),
            })
            .collect();

        tracing::info!(total_price, items = lines.len(), "creating payment order");
        let created = self
            .payments
            .create_payment_order(&CreateOrderRequest {
                total_price,
                products: lines,
                address_id: address.id.clone(),
            })
            .await
            .map_err(creation_error)?;

        // Phase 2: hand off to the payment UI with the authoritative amount.
        let order = GatewayOrder {
            gateway_order_id: created.gateway_order_id.clone(),
            amount_minor: created.amount,
        };
        let prefill = ContactPrefill {
            name: address.full_name.clone(),
            phone: address.phone_number.clone(),
            email: user.email.clone(),
        };
        let receipt = self
            .collector
            .collect(&order, &prefill)
            .await
            .map_err(|err| match err {
                CollectError::Cancelled => StoreError::Payment(PaymentFailure::Cancelled),
                CollectError::Failed(msg) => {
                    StoreError::Payment(PaymentFailure::Collection(msg))
                }
            })?;

        // Phase 3: only the backend's signature check proves the charge.
        tracing::info!(order_id = %created.order_id, "verifying payment signature");
        self.payments
            .verify_payment(&VerifyPaymentRequest {
                gateway_order_id: receipt.gateway_order_id,
                gateway_payment_id: receipt.gateway_payment_id,
                gateway_signature: receipt.gateway_signature,
                order_id: created.order_id.clone(),
            })
            .await
            .map_err(|err| match err {
                ApiError::Unauthorized => StoreError::AuthExpired,
                other => {
                    tracing::warn!(error = %other, "payment verification failed");
                    StoreError::Verification
                }
            })?;

        // The order is placed and paid at this point.  A failed clear must
        // not surface as a checkout failure (a retry would charge again);
        // the next cart refresh reconciles.
        if let Err(err) = cart.clear().await {
            tracing::warn!(error = %err, "cart clear failed after verified payment");
        }
        tracing::info!(order_id = %created.order_id, "order placed");
        Ok(PlacedOrder {
            order_id: created.order_id,
        })
    }
}

fn creation_error(err: ApiError) -> StoreError {
    match err {
        ApiError::Unauthorized => StoreError::AuthExpired,
        ApiError::Http(_) => StoreError::Network,
        ApiError::Api { message, .. } | ApiError::Rejected(message) => {
            StoreError::Payment(PaymentFailure::Creation(message))
        }
        other => StoreError::Payment(PaymentFailure::Creation(
            compact_str::format_compact!("{other}"),
        )),
    }
}
