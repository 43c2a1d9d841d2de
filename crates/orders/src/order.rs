use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use procura_core::{ContactId, DomainError, DomainResult, OrderId, Price, StockRecordId, UserId};

use crate::{OrderConfirmed, OrderStatus, OrderStatusChanged};

/// Listing details frozen onto a line at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub product_name: String,
    pub shop_name: String,
    pub unit_price: Price,
}

/// One (order, stock record) pair. Unique per order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub stock_record: StockRecordId,
    pub quantity: u32,
    /// `None` while the order is still a basket.
    pub snapshot: Option<LineSnapshot>,
}

impl LineItem {
    pub fn total(&self) -> Option<Price> {
        self.snapshot.as_ref().map(|s| s.unit_price.times(self.quantity))
    }
}

/// An order: a buyer's basket until checkout, a placed order afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user: UserId,
    pub status: OrderStatus,
    pub contact: Option<ContactId>,
    /// When the basket row was created.
    pub created_at: DateTime<Utc>,
    /// When the basket was checked out; `None` while it is still a basket.
    pub confirmed_at: Option<DateTime<Utc>>,
    pub items: Vec<LineItem>,
}

impl Order {
    /// A new empty basket for `user`.
    pub fn basket(user: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: OrderId::new(),
            user,
            status: OrderStatus::Basket,
            contact: None,
            created_at: now,
            confirmed_at: None,
            items: Vec::new(),
        }
    }

    pub fn is_basket(&self) -> bool {
        self.status == OrderStatus::Basket
    }

    /// Whether any basket line points at one of `records`.
    pub fn has_lines_for(&self, records: &BTreeSet<StockRecordId>) -> bool {
        self.is_basket() && self.items.iter().any(|l| records.contains(&l.stock_record))
    }

    fn ensure_basket(&self) -> DomainResult<()> {
        if self.is_basket() {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "order {} is {} and can no longer be edited",
                self.id, self.status
            )))
        }
    }

    fn ensure_quantity(quantity: u32) -> DomainResult<()> {
        if quantity == 0 {
            return Err(DomainError::invalid_input("quantity must be at least 1"));
        }
        Ok(())
    }

    /// Add units of a listing; an existing line is incremented.
    ///
    /// Returns the line's new quantity. No stock check happens here.
    pub fn add_item(&mut self, stock_record: StockRecordId, quantity: u32) -> DomainResult<u32> {
        self.ensure_basket()?;
        Self::ensure_quantity(quantity)?;

        match self.items.iter_mut().find(|l| l.stock_record == stock_record) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| DomainError::invalid_input("quantity is too large"))?;
                Ok(line.quantity)
            }
            None => {
                self.items.push(LineItem {
                    stock_record,
                    quantity,
                    snapshot: None,
                });
                Ok(quantity)
            }
        }
    }

    pub fn update_item(&mut self, stock_record: StockRecordId, quantity: u32) -> DomainResult<()> {
        self.ensure_basket()?;
        Self::ensure_quantity(quantity)?;

        let line = self
            .items
            .iter_mut()
            .find(|l| l.stock_record == stock_record)
            .ok_or_else(|| DomainError::not_found(format!("basket line for {stock_record}")))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn remove_item(&mut self, stock_record: StockRecordId) -> DomainResult<()> {
        self.ensure_basket()?;

        let before = self.items.len();
        self.items.retain(|l| l.stock_record != stock_record);
        if self.items.len() == before {
            return Err(DomainError::not_found(format!("basket line for {stock_record}")));
        }
        Ok(())
    }

    /// Drop basket lines whose listing no longer exists. Placed orders keep
    /// their snapshot lines.
    pub fn drop_lines_for(&mut self, removed: &BTreeSet<StockRecordId>) -> usize {
        if !self.is_basket() {
            return 0;
        }
        let before = self.items.len();
        self.items.retain(|l| !removed.contains(&l.stock_record));
        before - self.items.len()
    }

    /// Freeze the basket into a placed order.
    ///
    /// `snapshots` must hold an entry for every line; stock has already been
    /// reserved by the caller within the same transaction.
    pub fn confirm(
        &mut self,
        contact: ContactId,
        mut snapshots: BTreeMap<StockRecordId, LineSnapshot>,
        now: DateTime<Utc>,
    ) -> DomainResult<OrderConfirmed> {
        self.ensure_basket()?;
        if self.items.is_empty() {
            return Err(DomainError::invalid_input("basket is empty"));
        }

        let mut frozen = Vec::with_capacity(self.items.len());
        for line in &self.items {
            let snapshot = snapshots.remove(&line.stock_record).ok_or_else(|| {
                DomainError::not_found(format!("stock record {}", line.stock_record))
            })?;
            frozen.push(LineItem {
                snapshot: Some(snapshot),
                ..line.clone()
            });
        }

        self.items = frozen;
        self.status = OrderStatus::New;
        self.contact = Some(contact);
        self.confirmed_at = Some(now);

        Ok(OrderConfirmed {
            order_id: self.id,
            user_id: self.user,
            contact_id: contact,
            total: self.total(),
            line_count: self.items.len(),
            occurred_at: now,
        })
    }

    /// Move a placed order to `next` following the transition table.
    pub fn transition(
        &mut self,
        next: OrderStatus,
        changed_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<OrderStatusChanged> {
        self.status.ensure_transition(next)?;
        let from = self.status;
        self.status = next;

        Ok(OrderStatusChanged {
            order_id: self.id,
            user_id: self.user,
            from,
            to: next,
            changed_by,
            occurred_at: now,
        })
    }

    /// Quantities to give back to stock when this order is canceled.
    pub fn restock_list(&self) -> Vec<(StockRecordId, u32)> {
        self.items
            .iter()
            .map(|l| (l.stock_record, l.quantity))
            .collect()
    }

    /// Sum of snapshot line totals; zero for lines not yet priced.
    pub fn total(&self) -> Price {
        self.items.iter().filter_map(LineItem::total).sum()
    }
}
