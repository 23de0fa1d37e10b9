//! Request and response types for the storefront API.
//!
//! Field names follow the backend's camelCase JSON; Rust-side everything is
//! snake_case via `serde(rename_all)`.  Server ids are opaque strings (the
//! backend issues Mongo-style object ids), carried as [`CompactString`].
//!
//! [`CompactString`]: compact_str::CompactString

pub mod address;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod otp;
pub mod payment;

use compact_str::CompactString;
use serde::Deserialize;

/// Generic acknowledgement body for endpoints that return no payload beyond
/// the `{ success, message }` envelope (cart mutations, OTP dispatch, …).
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<CompactString>,
}
