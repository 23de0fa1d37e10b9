//! Delivery address book.
//!
//! The address list is a read-through cache over `GET /addresses`; every
//! mutation refetches the list before the operation completes, the same
//! discipline the cart follows.

use async_trait::async_trait;
use compact_str::CompactString;
use tokio::sync::{Mutex, watch};

use martkit_sdk::client::{ApiError, ShopperClient};
use martkit_sdk::objects::address::{Address, AddressPayload};

use crate::error::StoreError;

/// Draft of the seven required address fields, as typed into the form.
#[derive(Debug, Clone, Default)]
pub struct AddressForm {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    /// For a new address this comes frozen out of the verification flow;
    /// for an edit it is the address's existing number.
    pub phone_number: String,
}

impl AddressForm {
    /// All seven fields must be non-empty.  The phone number is not
    /// re-validated here: for new addresses it was fixed at OTP
    /// verification time, and for edits it is already trusted.
    pub fn validate(&self) -> Result<AddressPayload, StoreError> {
        let fields = [
            ("full name", &self.full_name),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
            ("postal code", &self.postal_code),
            ("phone number", &self.phone_number),
        ];
        for (label, value) in fields {
            if value.trim().is_empty() {
                return Err(StoreError::Validation(
                    compact_str::format_compact!("{label} is required"),
                ));
            }
        }
        Ok(AddressPayload {
            full_name: self.full_name.as_str().into(),
            address: self.address.clone(),
            city: self.city.as_str().into(),
            state: self.state.as_str().into(),
            country: self.country.as_str().into(),
            postal_code: self.postal_code.as_str().into(),
            phone_number: self.phone_number.as_str().into(),
        })
    }
}

/// The address endpoints the book needs.
#[async_trait]
pub trait AddressApi: Send + Sync {
    async fn list_addresses(&self) -> Result<Vec<Address>, ApiError>;
    async fn create_address(&self, payload: &AddressPayload) -> Result<(), ApiError>;
    async fn update_address(&self, id: &str, payload: &AddressPayload) -> Result<(), ApiError>;
    async fn delete_address(&self, id: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl AddressApi for ShopperClient {
    async fn list_addresses(&self) -> Result<Vec<Address>, ApiError> {
        ShopperClient::list_addresses(self).await
    }

    async fn create_address(&self, payload: &AddressPayload) -> Result<(), ApiError> {
        ShopperClient::create_address(self, payload).await
    }

    async fn update_address(&self, id: &str, payload: &AddressPayload) -> Result<(), ApiError> {
        ShopperClient::update_address(self, id, payload).await
    }

    async fn delete_address(&self, id: &str) -> Result<(), ApiError> {
        ShopperClient::delete_address(self, id).await
    }
}

/// Cached address list for one authenticated session.
pub struct AddressBook<A> {
    api: A,
    op_lock: Mutex<()>,
    list: watch::Sender<Vec<Address>>,
}

impl<A: AddressApi> AddressBook<A> {
    pub fn new(api: A) -> Self {
        let (list, _) = watch::channel(Vec::new());
        Self {
            api,
            op_lock: Mutex::new(()),
            list,
        }
    }

    /// The cached list; call [`refresh`](Self::refresh) first on a fresh
    /// session.
    pub fn addresses(&self) -> Vec<Address> {
        self.list.borrow().clone()
    }

    /// Look up a cached address by id.
    pub fn get(&self, id: &str) -> Option<Address> {
        self.list.borrow().iter().find(|a| a.id == id).cloned()
    }

    /// Replace the cache with the server's list.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let _op = self.op_lock.lock().await;
        self.refetch().await
    }

    /// Save a new address, then refetch the list.
    pub async fn create(&self, form: &AddressForm) -> Result<(), StoreError> {
        let payload = form.validate()?;
        let _op = self.op_lock.lock().await;
        tracing::debug!(city = %payload.city, "saving new address");
        self.api.create_address(&payload).await?;
        self.refetch().await
    }

    /// Update an existing address, then refetch the list.
    pub async fn update(&self, id: &str, form: &AddressForm) -> Result<(), StoreError> {
        let payload = form.validate()?;
        let _op = self.op_lock.lock().await;
        tracing::debug!(id, "updating address");
        self.api.update_address(id, &payload).await?;
        self.refetch().await
    }

    /// Delete an address, then refetch the list.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _op = self.op_lock.lock().await;
        tracing::debug!(id, "deleting address");
        self.api.delete_address(id).await?;
        self.refetch().await
    }

    async fn refetch(&self) -> Result<(), StoreError> {
        let addresses = self.api.list_addresses().await?;
        self.list.send_replace(addresses);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn form(phone: &str) -> AddressForm {
        AddressForm {
            full_name: "Asha Rao".into(),
            address: "12 MG Road".into(),
            city: "Bengaluru".into(),
            state: "Karnataka".into(),
            country: "India".into(),
            postal_code: "560001".into(),
            phone_number: phone.into(),
        }
    }

    #[derive(Default)]
    struct FakeAddressApi {
        rows: StdMutex<Vec<Address>>,
        next_id: AtomicU32,
    }

    #[async_trait]
    impl AddressApi for &FakeAddressApi {
        async fn list_addresses(&self) -> Result<Vec<Address>, ApiError> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn create_address(&self, payload: &AddressPayload) -> Result<(), ApiError> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.rows.lock().unwrap().push(Address {
                id: compact_str::format_compact!("a{id}"),
                full_name: payload.full_name.clone(),
                address: payload.address.clone(),
                city: payload.city.clone(),
                state: payload.state.clone(),
                country: payload.country.clone(),
                postal_code: payload.postal_code.clone(),
                phone_number: payload.phone_number.clone(),
            });
            Ok(())
        }

        async fn update_address(&self, id: &str, payload: &AddressPayload) -> Result<(), ApiError> {
            let mut rows = self.rows.lock().unwrap();
            let Some(row) = rows.iter_mut().find(|a| a.id == id) else {
                return Err(ApiError::Rejected("address not found".into()));
            };
            row.city = payload.city.clone();
            row.phone_number = payload.phone_number.clone();
            Ok(())
        }

        async fn delete_address(&self, id: &str) -> Result<(), ApiError> {
            self.rows.lock().unwrap().retain(|a| a.id != id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_create_refetches_list() {
        let api = FakeAddressApi::default();
        let book = AddressBook::new(&api);

        book.create(&form("9876543210")).await.unwrap();
        assert_eq!(book.addresses().len(), 1);
        assert_eq!(book.addresses()[0].id, "a0");
    }

    #[tokio::test]
    async fn test_empty_field_is_rejected_before_network() {
        let api = FakeAddressApi::default();
        let book = AddressBook::new(&api);

        let mut draft = form("9876543210");
        draft.postal_code = "  ".into();
        let err = book.create(&draft).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(book.addresses().is_empty());
        assert!(api.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_keep_cache_in_sync() {
        let api = FakeAddressApi::default();
        let book = AddressBook::new(&api);
        book.create(&form("9876543210")).await.unwrap();

        let mut draft = form("9876543210");
        draft.city = "Mysuru".into();
        book.update("a0", &draft).await.unwrap();
        assert_eq!(book.get("a0").unwrap().city, "Mysuru");

        book.delete("a0").await.unwrap();
        assert!(book.addresses().is_empty());
    }
}
