//! `procura-catalog`: suppliers' shops, products and per-shop stock.
//!
//! Pure domain types plus the catalog import document model. Persistence and
//! transactions live in `procura-infra`.

pub mod import;
pub mod product;
pub mod shop;
pub mod stock;

pub use import::{CatalogDocument, CategoryEntry, GoodEntry, ImportPlan, ParameterValue, PlannedGood};
pub use product::{Category, Offer, OfferFilter, Product};
pub use shop::Shop;
pub use stock::{StockRecord, StockShortfall};
