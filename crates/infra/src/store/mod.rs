//! Transactional in-memory marketplace store.
//!
//! All tables sit behind a single `RwLock`:
//!
//! ```text
//! read(|tables| ...)         shared lock, many readers at once
//! transaction(|tables| ...)  exclusive lock, one writer at a time
//!                              ├─ run the closure against the live tables;
//!                              │  each table journals a row's old value on
//!                              │  first write
//!                              └─ Ok         → forget the journal (commit)
//!                                 Err/panic  → restore journaled rows (rollback)
//! ```
//!
//! Lock hold time grows with the rows a transaction touches, not with the
//! size of the store.
//!
//! ## Guarantees
//!
//! - **Serializable**: writers are fully serialized, so two checkouts racing
//!   on the same stock record see each other's reservations
//! - **All-or-nothing**: a failing closure leaves no trace, whatever it
//!   mutated before returning the error
//! - **No torn reads**: readers only ever observe committed states
//!
//! Side effects that leave the process (notifications) must happen after
//! `transaction` returns, never inside the closure.

mod table;
mod tables;

use std::sync::RwLock;

use thiserror::Error;
use tracing::error;

use procura_core::{DomainError, DomainResult};

pub use table::Table;
pub use tables::Tables;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A writer panicked while holding the lock; the committed state is intact
    /// but the store refuses further work.
    #[error("store lock poisoned")]
    Poisoned,
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        DomainError::storage(value.to_string())
    }
}

#[derive(Debug, Default)]
pub struct MarketStore {
    tables: RwLock<Tables>,
}

impl MarketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a read-only query against the committed state.
    pub fn read<T>(&self, query: impl FnOnce(&Tables) -> DomainResult<T>) -> DomainResult<T> {
        let tables = self.tables.read().map_err(|_| {
            error!("store read lock poisoned");
            StoreError::Poisoned
        })?;
        query(&tables)
    }

    /// Run `work` as one atomic unit.
    pub fn transaction<T>(
        &self,
        work: impl FnOnce(&mut Tables) -> DomainResult<T>,
    ) -> DomainResult<T> {
        let mut tables = self.tables.write().map_err(|_| {
            error!("store write lock poisoned");
            StoreError::Poisoned
        })?;

        let mut pending = Pending {
            tables: &mut *tables,
            open: true,
        };
        let out = work(&mut *pending.tables)?;
        pending.tables.commit();
        pending.open = false;
        Ok(out)
    }
}

/// Rolls the tables back unless the transaction reached its commit, so an
/// error return or a panic inside the closure leaves the committed state.
struct Pending<'a> {
    tables: &'a mut Tables,
    open: bool,
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if self.open {
            self.tables.rollback();
        }
    }
}
