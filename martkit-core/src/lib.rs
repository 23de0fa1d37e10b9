//! Session services for the martkit storefront client.
//!
//! Everything here is a display cache over the remote API: no service
//! computes or stores anything the server does not also authoritatively
//! hold.  Writes follow a strict round-trip discipline: local intent →
//! remote call → refetch of the authoritative state before the operation
//! completes.  Optimistic local patches are never applied.
//!
//! Services are plain dependency-injected objects, constructed once per
//! session and shared by reference.  Each is generic over a small API trait
//! so tests run against in-memory fakes instead of the network.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod address;
pub mod cart;
pub mod checkout;
pub mod error;
pub mod orders;
pub mod pricing;
pub mod scope;
pub mod session;
pub mod verification;
