//! Supplier catalog documents.
//!
//! A document names the shop, declares categories and lists goods with
//! their price, stock and free-form parameters:
//!
//! ```yaml
//! shop: Связной
//! categories:
//!   - id: 224
//!     name: Смартфоны
//! goods:
//!   - id: 4216292
//!     category: 224
//!     model: apple/iphone/xs-max
//!     name: Смартфон Apple iPhone XS Max 512GB (золотистый)
//!     price: 110000
//!     price_rrc: 116990
//!     quantity: 14
//!     parameters:
//!       "Диагональ (дюйм)": 6.5
//!       "Цвет": золотистый
//! ```

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use procura_core::{CategoryId, DomainError, DomainResult, Price};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub shop: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
    #[serde(default)]
    pub goods: Vec<GoodEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodEntry {
    pub id: u64,
    pub category: u64,
    #[serde(default)]
    pub model: String,
    pub name: String,
    pub price: Decimal,
    pub price_rrc: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterValue>,
}

/// Parameter values arrive as whatever scalar the supplier wrote; they are
/// stored as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl core::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParameterValue::Bool(b) => write!(f, "{b}"),
            ParameterValue::Integer(i) => write!(f, "{i}"),
            ParameterValue::Float(x) => write!(f, "{x}"),
            ParameterValue::Text(s) => f.write_str(s),
        }
    }
}

/// A validated document, ready to be applied in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPlan {
    pub shop_name: String,
    pub url: Option<String>,
    pub categories: Vec<(CategoryId, String)>,
    pub goods: Vec<PlannedGood>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedGood {
    pub external_id: u64,
    pub category: CategoryId,
    pub name: String,
    pub model: String,
    pub price: Price,
    pub price_rrc: Price,
    pub quantity: u32,
    pub parameters: BTreeMap<String, String>,
}

impl CatalogDocument {
    pub fn from_yaml(text: &str) -> DomainResult<Self> {
        serde_norway::from_str(text)
            .map_err(|e| DomainError::invalid_input(format!("malformed catalog document: {e}")))
    }

    /// Check the whole document up front so a bad record never reaches the store.
    ///
    /// `category_exists` answers for categories already stored; categories
    /// declared in the document itself are always accepted.
    pub fn validate(&self, category_exists: impl Fn(CategoryId) -> bool) -> DomainResult<ImportPlan> {
        let shop_name = self.shop.trim();
        if shop_name.is_empty() {
            return Err(DomainError::invalid_input("shop name cannot be empty"));
        }

        let mut declared = BTreeSet::new();
        let mut categories = Vec::with_capacity(self.categories.len());
        for c in &self.categories {
            if c.name.trim().is_empty() {
                return Err(DomainError::invalid_input(format!(
                    "category {} has an empty name",
                    c.id
                )));
            }
            if !declared.insert(c.id) {
                return Err(DomainError::invalid_input(format!(
                    "category {} declared twice",
                    c.id
                )));
            }
            categories.push((CategoryId(c.id), c.name.trim().to_string()));
        }

        let mut seen = BTreeSet::new();
        let mut goods = Vec::with_capacity(self.goods.len());
        for g in &self.goods {
            let name = g.name.trim();
            if name.is_empty() {
                return Err(DomainError::invalid_input(format!("good {} has an empty name", g.id)));
            }
            let category = CategoryId(g.category);
            if !declared.contains(&g.category) && !category_exists(category) {
                return Err(DomainError::invalid_input(format!(
                    "good {} references unknown category {}",
                    g.id, g.category
                )));
            }
            if !seen.insert((name.to_string(), g.id)) {
                return Err(DomainError::invalid_input(format!(
                    "good '{name}' with id {} listed twice",
                    g.id
                )));
            }

            goods.push(PlannedGood {
                external_id: g.id,
                category,
                name: name.to_string(),
                model: g.model.clone(),
                price: Price::new(g.price)?,
                price_rrc: Price::new(g.price_rrc)?,
                quantity: g.quantity,
                parameters: g
                    .parameters
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_string()))
                    .collect(),
            });
        }

        Ok(ImportPlan {
            shop_name: shop_name.to_string(),
            url: self.url.clone().filter(|u| !u.trim().is_empty()),
            categories,
            goods,
        })
    }
}
