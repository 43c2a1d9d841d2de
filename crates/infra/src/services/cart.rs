use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use procura_core::{DomainError, DomainResult, OrderId, Price, StockRecordId, UserId};
use procura_orders::Order;

use super::Marketplace;
use crate::store::Tables;

/// A basket line joined with its current listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasketLine {
    pub stock_record: StockRecordId,
    pub product_name: String,
    pub shop_name: String,
    pub unit_price: Price,
    pub quantity: u32,
    /// Units the shop has right now; not a reservation.
    pub available: u32,
    pub line_total: Price,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasketView {
    /// `None` until the user's basket has been created.
    pub order_id: Option<OrderId>,
    pub lines: Vec<BasketLine>,
    pub total: Price,
}

impl Marketplace {
    /// Idempotent; a user never ends up with two baskets.
    pub fn get_or_create_basket(&self, user: UserId) -> DomainResult<Order> {
        self.store
            .transaction(|t| Ok(t.basket_or_create(user, Utc::now()).clone()))
    }

    /// Add units of a listing to the user's basket. No stock check here.
    pub fn add_item(
        &self,
        user: UserId,
        stock_record: StockRecordId,
        quantity: u32,
    ) -> DomainResult<Order> {
        let order = self.store.transaction(|t| {
            let record = t.stock_record(stock_record)?;
            let shop = t.shop(record.shop)?;
            if !shop.is_active {
                return Err(DomainError::invalid_input(format!(
                    "shop '{}' is not accepting orders",
                    shop.name
                )));
            }

            let basket = t.basket_or_create(user, Utc::now());
            basket.add_item(stock_record, quantity)?;
            Ok(basket.clone())
        })?;

        info!(user_id = %user, order_id = %order.id, stock_record_id = %stock_record, quantity, "basket item added");
        Ok(order)
    }

    pub fn update_item(
        &self,
        user: UserId,
        stock_record: StockRecordId,
        quantity: u32,
    ) -> DomainResult<Order> {
        self.store.transaction(|t| {
            let basket = t.basket_mut(user)?;
            basket.update_item(stock_record, quantity)?;
            Ok(basket.clone())
        })
    }

    pub fn remove_item(&self, user: UserId, stock_record: StockRecordId) -> DomainResult<Order> {
        let order = self.store.transaction(|t| {
            let basket = t.basket_mut(user)?;
            basket.remove_item(stock_record)?;
            Ok(basket.clone())
        })?;

        debug!(user_id = %user, stock_record_id = %stock_record, "basket item removed");
        Ok(order)
    }

    /// Read-only; never creates a basket and never validates stock.
    pub fn view_basket(&self, user: UserId) -> DomainResult<BasketView> {
        self.store.read(|t| {
            let Some(basket) = t.basket_of(user) else {
                return Ok(BasketView {
                    order_id: None,
                    lines: Vec::new(),
                    total: Price::ZERO,
                });
            };

            let lines = basket
                .items
                .iter()
                .map(|line| basket_line(t, line.stock_record, line.quantity))
                .collect::<DomainResult<Vec<_>>>()?;
            let total = lines.iter().map(|l| l.line_total).sum();

            Ok(BasketView {
                order_id: Some(basket.id),
                lines,
                total,
            })
        })
    }
}

fn basket_line(t: &Tables, stock_record: StockRecordId, quantity: u32) -> DomainResult<BasketLine> {
    let record = t.stock_record(stock_record)?;
    let product = t.product(record.product)?;
    let shop = t.shop(record.shop)?;
    Ok(BasketLine {
        stock_record,
        product_name: product.name.clone(),
        shop_name: shop.name.clone(),
        unit_price: record.price,
        quantity,
        available: record.quantity(),
        line_total: record.price.times(quantity),
    })
}
