use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use procura_core::{CategoryId, ProductId, ShopId};

use crate::{Shop, StockRecord};

/// Product category. Ids come from supplier documents and are shared across shops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub shops: BTreeSet<ShopId>,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            shops: BTreeSet::new(),
        }
    }
}

/// Shop-independent catalog entry.
///
/// Identified by (name, category); created by imports and never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: CategoryId,
}

impl Product {
    pub fn new(name: impl Into<String>, category: CategoryId) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            category,
        }
    }
}

/// Browsing filter for [`Offer`] listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferFilter {
    pub category_id: Option<CategoryId>,
    pub shop_id: Option<ShopId>,
}

impl OfferFilter {
    pub fn matches(&self, product: &Product, record: &StockRecord) -> bool {
        self.category_id.is_none_or(|c| c == product.category)
            && self.shop_id.is_none_or(|s| s == record.shop)
    }
}

/// A purchasable listing, joined for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub record: StockRecord,
    pub product: Product,
    pub category_name: String,
    pub shop: Shop,
}
