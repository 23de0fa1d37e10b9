//! Wire types and typed HTTP clients for the martkit storefront API.
//!
//! The storefront backend is a REST API over HTTPS.  Public catalog
//! endpoints need no credentials; everything else carries a bearer token
//! issued at login.  Responses are wrapped in a `{ success, message, ... }`
//! envelope which the clients unwrap before handing typed payloads back.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod client;
pub mod objects;
