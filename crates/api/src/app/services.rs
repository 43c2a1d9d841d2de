//! Service wiring shared by all handlers.

use std::sync::Arc;

use procura_events::{NoopNotifier, Notifier};
use procura_infra::{MarketStore, Marketplace};

/// Everything a handler needs; cheap to clone behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AppServices {
    pub marketplace: Marketplace,
}

impl AppServices {
    pub fn new(marketplace: Marketplace) -> Self {
        Self { marketplace }
    }

    /// Fresh in-memory store with the given notification sink.
    pub fn with_notifier(notifier: Arc<dyn Notifier>, admin_email: Option<String>) -> Self {
        let marketplace = Marketplace::new(Arc::new(MarketStore::new()), notifier);
        let marketplace = match admin_email {
            Some(email) => marketplace.with_admin_email(email),
            None => marketplace,
        };
        Self::new(marketplace)
    }

    pub fn in_memory() -> Self {
        Self::with_notifier(Arc::new(NoopNotifier), None)
    }
}
