//! Marketplace application services.
//!
//! Every operation follows the same shape:
//!
//! ```text
//! check principal ─▶ store.transaction(|tables| domain calls) ─▶ commit
//!                                                               └─▶ emit notifications
//! ```
//!
//! Notifications are emitted only after the transaction committed; a failed
//! hand-off is logged and never undoes the operation.

mod accounts;
mod cart;
mod catalog_import;
mod checkout;
mod contacts;
mod history;
mod offers;
mod status;

use std::sync::Arc;

use tracing::{debug, warn};

use procura_events::{Event, Notification, Notifier};
use procura_orders::{Audience, OrderEvent};

use crate::store::MarketStore;

pub use cart::{BasketLine, BasketView};
pub use catalog_import::ImportSummary;
pub use history::OrderView;

/// Entry point for every marketplace operation.
#[derive(Clone)]
pub struct Marketplace {
    store: Arc<MarketStore>,
    notifier: Arc<dyn Notifier>,
    admin_email: Option<String>,
}

impl core::fmt::Debug for Marketplace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Marketplace")
            .field("admin_email", &self.admin_email)
            .finish_non_exhaustive()
    }
}

impl Marketplace {
    pub fn new(store: Arc<MarketStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            admin_email: None,
        }
    }

    /// Address receiving `order-placed-admin-alert` mails.
    pub fn with_admin_email(mut self, admin_email: impl Into<String>) -> Self {
        self.admin_email = Some(admin_email.into()).filter(|e: &String| !e.trim().is_empty());
        self
    }

    pub fn store(&self) -> &Arc<MarketStore> {
        &self.store
    }

    /// Announce a committed order event to everyone it concerns.
    fn publish(&self, event: OrderEvent, audience: Audience) {
        debug!(
            event_type = event.event_type(),
            version = event.version(),
            order_id = %event.order_id(),
            "publishing order event"
        );
        for notification in event.notifications(&audience) {
            self.emit(notification);
        }
    }

    fn emit(&self, notification: Notification) {
        let kind = notification.kind;
        let id = notification.id;
        if let Err(e) = self.notifier.notify(notification) {
            warn!(notification_id = %id, kind = %kind, error = %e, "failed to queue notification");
        }
    }
}
