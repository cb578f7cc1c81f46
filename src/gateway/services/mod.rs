//! Gateway Services Layer
//!
//! Business logic behind the catalogue actions. Handlers stay thin HTTP
//! adapters that gate the request and delegate here.

pub mod order;
pub mod product;

pub use order::{IntakeOutcome, InventoryEffect, OrderService};
pub use product::ProductService;
