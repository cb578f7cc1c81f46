//! Storefront Gateway - catalogue and order intake service
//!
//! A stateless HTTP handler in front of a hosted relational backend. Owners
//! manage products and orders; anyone can place an order.
//!
//! # Modules
//!
//! - [`core_types`] - Id aliases and shared constants
//! - [`config`] - YAML configuration with environment overrides
//! - [`logging`] - tracing subscriber setup
//! - [`models`] - Order status, inventory map and row types
//! - [`error`] - Service error taxonomy and HTTP mapping
//! - [`store`] - Catalogue backend trait and implementations
//! - [`db`] - PostgreSQL connection pool
//! - [`auth`] - Bearer token verification and owner gate
//! - [`gateway`] - axum router, handlers and services

// Core types - must be first!
pub mod core_types;

pub mod config;
pub mod logging;
pub mod models;

pub mod error;

pub mod db;
pub mod store;

pub mod auth;
pub mod gateway;

// Convenient re-exports at crate root
pub use core_types::{Cents, OrderId, ProductId, UserId};
pub use error::ServiceError;
pub use models::{Inventory, NewOrder, NewOrderItem, OrderStatus};
pub use store::{CatalogueStore, StoreError};
