//! Gateway types module
//!
//! ## Input Types
//! - [`Action`]: closed set of catalogue actions parsed from the body
//! - [`Checkout`]: normalized `createOrder` payload
//! - [`StatusChange`]: validated `updateOrderStatus` payload
//!
//! ## Output Types
//! - [`ApiResponse`]: unified response envelope

pub mod order;
pub mod request;
pub mod response;

pub use order::{
    Checkout, LineItem, StatusChange, filter_line_items, order_total, parse_checkout,
    parse_status_change,
};
pub use request::{Action, CatalogueRequest, parse_body};
pub use response::{ApiResponse, HealthResponse, missing_orders_meta};
