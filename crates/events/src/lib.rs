//! `procura-events`: lifecycle events and the notification sink contract.
//!
//! This crate is **mechanics only**: it knows what a notification looks like
//! and how it is handed off, not how mail is rendered or delivered.

pub mod event;
pub mod notification;
pub mod notifier;

pub use event::Event;
pub use notification::{Notification, NotificationBuilder, NotificationKind, Payload};
pub use notifier::{InMemoryNotifier, NoopNotifier, Notifier, NotifyError};
