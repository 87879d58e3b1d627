//! Courier provider abstraction for the storefront checkout core.
//!
//! Shipping-method keys resolve against a registry of `CourierProvider`
//! implementations populated at startup. Absence of a provider for a key is
//! a valid state (home delivery has no courier integration), never an error.

pub mod error;
pub mod provider;
pub mod registry;
pub mod stub;
pub mod tcs;

pub use error::{CourierError, Result};
pub use provider::{BookedConsignment, ConsignmentRequest, CourierProvider};
pub use registry::CourierRegistry;
pub use stub::StubCourier;
pub use tcs::{InMemoryTcsGateway, TcsConfig, TcsCourier, TcsGateway};
