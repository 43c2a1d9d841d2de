use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use procura_core::{Price, ProductId, ShopId, StockRecordId};

/// A shop's listing of a product: price and available quantity.
///
/// `quantity` is unsigned and only changes through [`StockRecord::reserve`]
/// and [`StockRecord::release`] (or by an import replacing the record), so it
/// can never go below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: StockRecordId,
    pub product: ProductId,
    pub shop: ShopId,
    /// Supplier's own id for the good.
    pub external_id: u64,
    pub model: String,
    pub price: Price,
    /// Recommended retail price.
    pub price_rrc: Price,
    quantity: u32,
    /// Parameter name to value.
    pub parameters: BTreeMap<String, String>,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("requested {requested}, only {available} available")]
pub struct StockShortfall {
    pub requested: u32,
    pub available: u32,
}

impl StockRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        product: ProductId,
        shop: ShopId,
        external_id: u64,
        model: impl Into<String>,
        price: Price,
        price_rrc: Price,
        quantity: u32,
        parameters: BTreeMap<String, String>,
    ) -> Self {
        Self {
            id: StockRecordId::new(),
            product,
            shop,
            external_id,
            model: model.into(),
            price,
            price_rrc,
            quantity,
            parameters,
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn can_reserve(&self, requested: u32) -> bool {
        requested <= self.quantity
    }

    /// Take `requested` units out of stock, all or nothing.
    pub fn reserve(&mut self, requested: u32) -> Result<(), StockShortfall> {
        self.quantity = self
            .quantity
            .checked_sub(requested)
            .ok_or(StockShortfall {
                requested,
                available: self.quantity,
            })?;
        Ok(())
    }

    /// Put units back (order cancellation).
    pub fn release(&mut self, quantity: u32) {
        self.quantity = self.quantity.saturating_add(quantity);
    }
}
