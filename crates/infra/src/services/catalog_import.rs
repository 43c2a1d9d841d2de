use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;

use procura_auth::{Principal, ensure_shop_owner, require_supplier};
use procura_catalog::{CatalogDocument, Category, Product, Shop, StockRecord};
use procura_core::{DomainError, DomainResult, ShopId, StockRecordId};

use super::Marketplace;
use crate::store::Tables;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub shop_id: ShopId,
    pub shop_name: String,
    pub created_shop: bool,
    pub categories: usize,
    pub goods: usize,
    pub removed_records: usize,
    /// Basket lines dropped because their listing was replaced.
    pub dropped_basket_lines: usize,
}

impl Marketplace {
    /// Replace the whole catalog of the actor's shop with `document`.
    ///
    /// Delete-then-recreate of every stock record and parameter value of the
    /// shop, atomically: any bad record rolls the whole import back.
    pub fn replace_shop_catalog(
        &self,
        actor: &Principal,
        document: &CatalogDocument,
    ) -> DomainResult<ImportSummary> {
        require_supplier(actor)?;

        let summary = self.store.transaction(|t| {
            let (shop_id, created_shop) = claim_shop(t, actor, document.shop.trim())?;
            let plan = document.validate(|c| t.category_exists(c))?;

            if plan.url.is_some() {
                t.shop_mut(shop_id)?.url = plan.url.clone();
            }

            for (id, name) in &plan.categories {
                let category = t
                    .categories
                    .get_or_insert_with(*id, || Category::new(*id, name.clone()));
                category.shops.insert(shop_id);
            }
            for good in &plan.goods {
                let linked = t
                    .categories
                    .get(&good.category)
                    .is_some_and(|c| c.shops.contains(&shop_id));
                if !linked {
                    if let Some(category) = t.categories.get_mut(&good.category) {
                        category.shops.insert(shop_id);
                    }
                }
            }

            let removed: BTreeSet<StockRecordId> = t
                .stock
                .values()
                .filter(|r| r.shop == shop_id)
                .map(|r| r.id)
                .collect();
            t.stock.retain(|id, _| !removed.contains(id));

            for good in &plan.goods {
                let product_id = match t.product_by_key(good.category, &good.name) {
                    Some(id) => id,
                    None => t.insert_product(Product::new(good.name.clone(), good.category)),
                };

                t.register_parameters(good.parameters.keys());

                let record = StockRecord::new(
                    product_id,
                    shop_id,
                    good.external_id,
                    good.model.clone(),
                    good.price,
                    good.price_rrc,
                    good.quantity,
                    good.parameters.clone(),
                );
                t.stock.insert(record.id, record);
            }

            let mut dropped_basket_lines = 0;
            t.orders.update_where(
                |o| o.has_lines_for(&removed),
                |o| dropped_basket_lines += o.drop_lines_for(&removed),
            );

            Ok(ImportSummary {
                shop_id,
                shop_name: plan.shop_name.clone(),
                created_shop,
                categories: plan.categories.len(),
                goods: plan.goods.len(),
                removed_records: removed.len(),
                dropped_basket_lines,
            })
        })?;

        info!(
            shop_id = %summary.shop_id,
            shop = %summary.shop_name,
            goods = summary.goods,
            removed = summary.removed_records,
            dropped_basket_lines = summary.dropped_basket_lines,
            "catalog replaced"
        );
        Ok(summary)
    }

    /// Parse a YAML document and import it.
    pub fn import_catalog_yaml(&self, actor: &Principal, yaml: &str) -> DomainResult<ImportSummary> {
        require_supplier(actor)?;
        let document = CatalogDocument::from_yaml(yaml)?;
        self.replace_shop_catalog(actor, &document)
    }

    /// Open or close the actor's shop for orders.
    pub fn set_shop_active(&self, actor: &Principal, is_active: bool) -> DomainResult<Shop> {
        require_supplier(actor)?;

        let shop = self.store.transaction(|t| {
            let shop_id = t
                .shop_of_owner(actor.user_id)
                .map(|s| s.id)
                .ok_or_else(|| DomainError::not_found(format!("shop of user {}", actor.user_id)))?;
            let shop = t.shop_mut(shop_id)?;
            shop.is_active = is_active;
            Ok(shop.clone())
        })?;

        info!(shop_id = %shop.id, is_active, "shop state changed");
        Ok(shop)
    }
}

/// Find the shop named in the document or open it for the actor.
fn claim_shop(t: &mut Tables, actor: &Principal, name: &str) -> DomainResult<(ShopId, bool)> {
    if name.is_empty() {
        return Err(DomainError::invalid_input("shop name cannot be empty"));
    }

    if let Some(shop) = t.shop_by_name(name) {
        ensure_shop_owner(actor, name, shop.owner)?;
        return Ok((shop.id, false));
    }

    if let Some(owned) = t.shop_of_owner(actor.user_id) {
        return Err(DomainError::conflict(format!(
            "user already owns shop '{}'",
            owned.name
        )));
    }

    Ok((t.insert_shop(Shop::open(name, actor.user_id)), true))
}
