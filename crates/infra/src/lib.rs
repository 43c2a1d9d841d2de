//! Infrastructure layer: transactional store, marketplace services and
//! notification delivery.

pub mod jobs;
pub mod notify;
pub mod services;
pub mod store;


pub use notify::{NotificationConfig, NotificationQueue, NotificationRuntime};
pub use services::{BasketLine, BasketView, ImportSummary, Marketplace, OrderView};
pub use store::{MarketStore, StoreError, Tables};
