//! `procura-orders`: baskets, placed orders and their status lifecycle.

pub mod contact;
pub mod events;
pub mod order;
pub mod status;

pub use contact::{Contact, ContactDraft};
pub use events::{Audience, OrderConfirmed, OrderEvent, OrderStatusChanged};
pub use order::{LineItem, LineSnapshot, Order};
pub use status::OrderStatus;
