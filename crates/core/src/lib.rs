//! `procura-core`: marketplace foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod money;

pub use error::{DomainError, DomainResult, ErrorKind};
pub use id::{CategoryId, ContactId, OrderId, ProductId, ShopId, StockRecordId, UserId};
pub use money::Price;
