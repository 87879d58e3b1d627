//! Shared types for the storefront checkout core.

pub mod types;

pub use types::{Money, OrderRef, ProductId, VariantId};
