//! Cart state holder.
//!
//! The local cart is a display cache over `GET /carts`.  Every successful
//! mutation refetches the authoritative cart before the operation returns;
//! no optimistic patch is ever applied, so displayed state can never drift
//! from the server.  Mutations are serialized through one async lock per
//! service so two rapid quantity changes cannot interleave their refetches.

use async_trait::async_trait;
use compact_str::CompactString;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, watch};

use martkit_sdk::client::{ApiError, ShopperClient};
use martkit_sdk::objects::cart::{
    AddToCartRequest, CartEntry, RemoveFromCartRequest, UpdateQuantityRequest, Variant,
};

use crate::error::StoreError;
use crate::pricing::{self, CartTotals};
use crate::session::SessionSnapshot;

/// One product line in the cart, keyed by product id.
///
/// Invariant: `quantity >= 1` for any item present; a quantity-zero update
/// removes the line instead.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineItem {
    pub product_id: CompactString,
    pub name: CompactString,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub image: Option<String>,
    pub quantity: u32,
    pub variant: Option<Variant>,
}

impl From<CartEntry> for CartLineItem {
    fn from(entry: CartEntry) -> Self {
        let image = entry.product.display_image().map(str::to_owned);
        Self {
            product_id: entry.product.id,
            name: entry.product.name,
            price: entry.product.price,
            discount_price: entry.product.discount_price,
            image,
            quantity: entry.quantity,
            variant: entry.variant,
        }
    }
}

/// Published cart state: the line items plus the shared loading flag, true
/// while any mutating or refreshing call is in flight.
#[derive(Debug, Clone, Default)]
pub struct CartSnapshot {
    pub items: Vec<CartLineItem>,
    pub loading: bool,
}

/// The cart endpoints the service needs.
#[async_trait]
pub trait CartApi: Send + Sync {
    async fn fetch_cart(&self) -> Result<Vec<CartEntry>, ApiError>;
    async fn add_to_cart(&self, req: &AddToCartRequest) -> Result<(), ApiError>;
    async fn remove_from_cart(&self, req: &RemoveFromCartRequest) -> Result<(), ApiError>;
    async fn update_quantity(&self, req: &UpdateQuantityRequest) -> Result<(), ApiError>;
    async fn clear_cart(&self) -> Result<(), ApiError>;
}

#[async_trait]
impl CartApi for ShopperClient {
    async fn fetch_cart(&self) -> Result<Vec<CartEntry>, ApiError> {
        ShopperClient::fetch_cart(self).await
    }

    async fn add_to_cart(&self, req: &AddToCartRequest) -> Result<(), ApiError> {
        ShopperClient::add_to_cart(self, req).await
    }

    async fn remove_from_cart(&self, req: &RemoveFromCartRequest) -> Result<(), ApiError> {
        ShopperClient::remove_from_cart(self, req).await
    }

    async fn update_quantity(&self, req: &UpdateQuantityRequest) -> Result<(), ApiError> {
        ShopperClient::update_quantity(self, req).await
    }

    async fn clear_cart(&self) -> Result<(), ApiError> {
        ShopperClient::clear_cart(self).await
    }
}

/// Cart state holder for one authenticated session.
pub struct CartService<A> {
    api: A,
    session: watch::Receiver<SessionSnapshot>,
    // Held across the network round trip of every mutation: single-flight
    // per session.
    op_lock: Mutex<()>,
    snapshot: watch::Sender<CartSnapshot>,
}

impl<A: CartApi> CartService<A> {
    pub fn new(api: A, session: watch::Receiver<SessionSnapshot>) -> Self {
        let (snapshot, _) = watch::channel(CartSnapshot::default());
        Self {
            api,
            session,
            op_lock: Mutex::new(()),
            snapshot,
        }
    }

    /// Current cart snapshot.
    pub fn snapshot(&self) -> CartSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to cart changes.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.snapshot.subscribe()
    }

    /// Price breakdown of the current snapshot.
    pub fn totals(&self) -> CartTotals {
        pricing::totals(&self.snapshot.borrow().items)
    }

    /// Replace local state with the authoritative server cart.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        self.require_user()?;
        let _op = self.op_lock.lock().await;
        let _loading = LoadingGuard::engage(&self.snapshot);
        self.refetch().await
    }

    /// Add `quantity` of a product, then refetch.
    pub async fn add(&self, product_id: &str, quantity: u32) -> Result<(), StoreError> {
        if quantity == 0 {
            return Err(StoreError::validation("quantity must be at least 1"));
        }
        self.require_user()?;

        let _op = self.op_lock.lock().await;
        let _loading = LoadingGuard::engage(&self.snapshot);
        tracing::debug!(product_id, quantity, "adding to cart");
        self.api
            .add_to_cart(&AddToCartRequest {
                product_id: product_id.into(),
                quantity,
            })
            .await?;
        self.refetch().await
    }

    /// Remove a product, then refetch.  Removing an absent product is a
    /// server-side no-op and simply results in an unchanged refetch.
    pub async fn remove(&self, product_id: &str) -> Result<(), StoreError> {
        self.require_user()?;

        let _op = self.op_lock.lock().await;
        let _loading = LoadingGuard::engage(&self.snapshot);
        tracing::debug!(product_id, "removing from cart");
        self.api
            .remove_from_cart(&RemoveFromCartRequest {
                product_id: product_id.into(),
            })
            .await?;
        self.refetch().await
    }

    /// Set the quantity of a product already in the cart.  Zero is defined
    /// to be [`remove`](Self::remove).
    pub async fn set_quantity(&self, product_id: &str, quantity: u32) -> Result<(), StoreError> {
        if quantity == 0 {
            return self.remove(product_id).await;
        }
        self.require_user()?;

        let _op = self.op_lock.lock().await;
        let _loading = LoadingGuard::engage(&self.snapshot);
        tracing::debug!(product_id, quantity, "updating quantity");
        self.api
            .update_quantity(&UpdateQuantityRequest {
                product_id: product_id.into(),
                quantity,
            })
            .await?;
        self.refetch().await
    }

    /// Empty the server-side cart and the local state together.  Called by
    /// checkout after a verified payment.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.require_user()?;

        let _op = self.op_lock.lock().await;
        let _loading = LoadingGuard::engage(&self.snapshot);
        tracing::debug!("clearing cart");
        self.api.clear_cart().await?;
        self.snapshot.send_modify(|s| s.items.clear());
        Ok(())
    }

    /// Drop local state without touching the server.  Used when the session
    /// signs out; the server cart belongs to the account, not the device.
    pub fn reset(&self) {
        self.snapshot.send_modify(|s| s.items.clear());
    }

    fn require_user(&self) -> Result<(), StoreError> {
        if self.session.borrow().user.is_some() {
            Ok(())
        } else {
            Err(StoreError::AuthExpired)
        }
    }

    async fn refetch(&self) -> Result<(), StoreError> {
        let entries = self.api.fetch_cart().await?;
        let items: Vec<CartLineItem> = entries.into_iter().map(Into::into).collect();
        self.snapshot.send_modify(|s| s.items = items);
        Ok(())
    }
}

/// Sets the shared loading flag and always releases it, success or failure.
struct LoadingGuard<'a> {
    snapshot: &'a watch::Sender<CartSnapshot>,
}

impl<'a> LoadingGuard<'a> {
    fn engage(snapshot: &'a watch::Sender<CartSnapshot>) -> Self {
        snapshot.send_modify(|s| s.loading = true);
        Self { snapshot }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.snapshot.send_modify(|s| s.loading = false);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use martkit_sdk::objects::auth::User;
    use martkit_sdk::objects::cart::CartProduct;
    use std::sync::Mutex as StdMutex;

    /// In-memory stand-in for the server-side cart.  Records every call so
    /// tests can assert the refetch-after-mutation discipline.
    #[derive(Default)]
    struct FakeCartApi {
        rows: StdMutex<Vec<(CompactString, u32)>>,
        calls: StdMutex<Vec<&'static str>>,
        fail_next: StdMutex<bool>,
    }

    impl FakeCartApi {
        fn log(&self, call: &'static str) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(call);
            if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
                return Err(ApiError::Rejected("simulated failure".into()));
            }
            Ok(())
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn entry(id: &str, quantity: u32) -> CartEntry {
            CartEntry {
                product: CartProduct {
                    id: id.into(),
                    name: id.into(),
                    price: Decimal::from(100),
                    discount_price: None,
                    images: vec![],
                    image: None,
                },
                quantity,
                variant: None,
            }
        }
    }

    #[async_trait]
    impl CartApi for &FakeCartApi {
        async fn fetch_cart(&self) -> Result<Vec<CartEntry>, ApiError> {
            self.log("fetch")?;
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .map(|(id, q)| FakeCartApi::entry(id, *q))
                .collect())
        }

        async fn add_to_cart(&self, req: &AddToCartRequest) -> Result<(), ApiError> {
            self.log("add")?;
            let mut rows = self.rows.lock().unwrap();
            match rows.iter_mut().find(|(id, _)| *id == req.product_id) {
                Some((_, q)) => *q += req.quantity,
                None => rows.push((req.product_id.clone(), req.quantity)),
            }
            Ok(())
        }

        async fn remove_from_cart(&self, req: &RemoveFromCartRequest) -> Result<(), ApiError> {
            self.log("remove")?;
            self.rows
                .lock()
                .unwrap()
                .retain(|(id, _)| *id != req.product_id);
            Ok(())
        }

        async fn update_quantity(&self, req: &UpdateQuantityRequest) -> Result<(), ApiError> {
            self.log("update")?;
            let mut rows = self.rows.lock().unwrap();
            if let Some((_, q)) = rows.iter_mut().find(|(id, _)| *id == req.product_id) {
                *q = req.quantity;
            }
            Ok(())
        }

        async fn clear_cart(&self) -> Result<(), ApiError> {
            self.log("clear")?;
            self.rows.lock().unwrap().clear();
            Ok(())
        }
    }

    fn signed_in() -> watch::Receiver<SessionSnapshot> {
        // The sender side may drop; receivers keep the last value.
        let (_tx, rx) = watch::channel(SessionSnapshot {
            user: Some(User {
                id: "u1".into(),
                name: "Asha".into(),
                email: "asha@example.com".into(),
            }),
            loading: false,
        });
        rx
    }

    fn signed_out() -> watch::Receiver<SessionSnapshot> {
        let (_tx, rx) = watch::channel(SessionSnapshot::default());
        rx
    }

    #[tokio::test]
    async fn test_add_refetches_authoritative_state() {
        let api = FakeCartApi::default();
        let cart = CartService::new(&api, signed_in());

        cart.add("p1", 2).await.unwrap();

        assert_eq!(api.calls(), vec!["add", "fetch"]);
        let snapshot = cart.snapshot();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].quantity, 2);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_add_zero_quantity_is_rejected_before_network() {
        let api = FakeCartApi::default();
        let cart = CartService::new(&api, signed_in());

        let err = cart.add("p1", 0).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_requires_authentication() {
        let api = FakeCartApi::default();
        let cart = CartService::new(&api, signed_out());

        let err = cart.add("p1", 1).await.unwrap_err();
        assert!(matches!(err, StoreError::AuthExpired));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_set_quantity_zero_matches_remove() {
        let api = FakeCartApi::default();
        let cart = CartService::new(&api, signed_in());
        cart.add("p1", 3).await.unwrap();
        cart.add("p2", 1).await.unwrap();

        cart.set_quantity("p1", 0).await.unwrap();
        let via_set = cart.snapshot().items;

        // Rebuild the same cart and remove instead.
        let api2 = FakeCartApi::default();
        let cart2 = CartService::new(&api2, signed_in());
        cart2.add("p1", 3).await.unwrap();
        cart2.add("p2", 1).await.unwrap();
        cart2.remove("p1").await.unwrap();

        assert_eq!(via_set, cart2.snapshot().items);
        // The zero-quantity path issued a remove call, not an update.
        assert!(api.calls().contains(&"remove"));
        assert!(!api.calls().contains(&"update"));
    }

    #[tokio::test]
    async fn test_remove_absent_product_is_a_noop_refetch() {
        let api = FakeCartApi::default();
        let cart = CartService::new(&api, signed_in());
        cart.add("p1", 1).await.unwrap();

        cart.remove("ghost").await.unwrap();
        assert_eq!(cart.snapshot().items.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_prior_state_and_clears_loading() {
        let api = FakeCartApi::default();
        let cart = CartService::new(&api, signed_in());
        cart.add("p1", 2).await.unwrap();
        let before = cart.snapshot().items;

        *api.fail_next.lock().unwrap() = true;
        let err = cart.add("p2", 1).await.unwrap_err();
        assert!(matches!(err, StoreError::Server(_)));

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.items, before);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_mutated_state_equals_fresh_fetch() {
        let api = FakeCartApi::default();
        let cart = CartService::new(&api, signed_in());
        cart.add("p1", 2).await.unwrap();
        cart.set_quantity("p1", 5).await.unwrap();

        let after_mutation = cart.snapshot().items;
        cart.refresh().await.unwrap();
        assert_eq!(cart.snapshot().items, after_mutation);
    }

    #[tokio::test]
    async fn test_clear_empties_server_and_local_state() {
        let api = FakeCartApi::default();
        let cart = CartService::new(&api, signed_in());
        cart.add("p1", 2).await.unwrap();

        cart.clear().await.unwrap();
        assert!(cart.snapshot().items.is_empty());
        assert!(api.rows.lock().unwrap().is_empty());
    }
}
