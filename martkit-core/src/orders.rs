//! Order history.
//!
//! Read-only cache over `GET /orders`, replaced wholesale on every refresh.

use async_trait::async_trait;
use tokio::sync::watch;

use martkit_sdk::client::{ApiError, ShopperClient};
use martkit_sdk::objects::order::Order;

use crate::error::StoreError;

/// The order endpoints the history needs.
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError>;
}

#[async_trait]
impl OrderApi for ShopperClient {
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        ShopperClient::list_orders(self).await
    }
}

/// Cached order history for one authenticated session.
pub struct OrderHistory<A> {
    api: A,
    list: watch::Sender<Vec<Order>>,
}

impl<A: OrderApi> OrderHistory<A> {
    pub fn new(api: A) -> Self {
        let (list, _) = watch::channel(Vec::new());
        Self { api, list }
    }

    /// The cached list, newest first as the server returns it.
    pub fn orders(&self) -> Vec<Order> {
        self.list.borrow().clone()
    }

    /// Look up a cached order by id.
    pub fn get(&self, id: &str) -> Option<Order> {
        self.list.borrow().iter().find(|o| o.id == id).cloned()
    }

    /// Replace the cache with the server's list.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let orders = self.api.list_orders().await?;
        self.list.send_replace(orders);
        Ok(())
    }
}
