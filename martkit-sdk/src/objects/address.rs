//! Address API types.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A saved delivery address, owned server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "_id")]
    pub id: CompactString,
    pub full_name: CompactString,
    pub address: String,
    pub city: CompactString,
    pub state: CompactString,
    pub country: CompactString,
    pub postal_code: CompactString,
    pub phone_number: CompactString,
}

/// Create/update body for an address.  All seven fields are required
/// non-empty; validation happens client-side before the request is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    pub full_name: CompactString,
    pub address: String,
    pub city: CompactString,
    pub state: CompactString,
    pub country: CompactString,
    pub postal_code: CompactString,
    pub phone_number: CompactString,
}

/// Response body of `GET /addresses`.
///
/// The backend has shipped the list under both `addresses` and `data`
/// depending on version; accept either.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressListResponse {
    #[serde(default)]
    addresses: Option<Vec<Address>>,
    #[serde(default)]
    data: Option<Vec<Address>>,
}

impl AddressListResponse {
    /// Whichever key the server used, empty if neither is present.
    pub fn into_addresses(self) -> Vec<Address> {
        self.addresses.or(self.data).unwrap_or_default()
    }
}
