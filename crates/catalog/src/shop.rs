use serde::{Deserialize, Serialize};

use procura_core::{ShopId, UserId};

/// A supplier's storefront.
///
/// Owned by exactly one supplier account; `is_active` decides whether its
/// stock can be ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub url: Option<String>,
    pub owner: UserId,
    pub is_active: bool,
}

impl Shop {
    /// A freshly registered shop accepts orders right away.
    pub fn open(name: impl Into<String>, owner: UserId) -> Self {
        Self {
            id: ShopId::new(),
            name: name.into(),
            url: None,
            owner,
            is_active: true,
        }
    }
}
