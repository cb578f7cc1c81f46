//! HTTP handlers
//!
//! - [`catalogue`]: the single action endpoint
//! - [`health`]: backend reachability probe

pub mod catalogue;
pub mod health;
pub mod helpers;

pub use catalogue::{catalogue, preflight};
pub use health::health_check;
