//! Order domain for the storefront checkout core.
//!
//! This crate provides the durable record of a purchase:
//! - the `Order` aggregate with its status state machine and append-only
//!   status history
//! - the embedded courier sub-document (consignee snapshot, tracking state)
//! - the `OrderRepository` contract with in-memory and PostgreSQL
//!   implementations, including the durable atomic order-number sequence

pub mod courier;
pub mod error;
pub mod memory;
pub mod order;
pub mod postgres;
pub mod repository;
pub mod status;
pub mod value_objects;

pub use courier::{Consignee, CourierInfo, CourierStatus, TrackingEvent};
pub use error::{OrderError, Result};
pub use memory::InMemoryOrderRepository;
pub use order::{Order, OrderDraft};
pub use postgres::PostgresOrderRepository;
pub use repository::{OrderIds, OrderRepository};
pub use status::OrderStatus;
pub use value_objects::{
    Address, ChangedBy, Contact, OrderItem, Payment, PaymentMethod, PaymentStatus, StatusChange,
};
