//! Data Transfer Objects for REST request/response serialization.
//!
//! Amounts are plain integers in currency subunits. Domain records
//! (products, orders, top-up requests) are returned as-is.

pub mod admin_dto;
pub mod common_dto;
pub mod feed_dto;
pub mod order_dto;
pub mod top_up_dto;
pub mod wallet_dto;

pub use admin_dto::*;
pub use common_dto::*;
pub use feed_dto::*;
pub use order_dto::*;
pub use top_up_dto::*;
pub use wallet_dto::*;
