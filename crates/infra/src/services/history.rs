use serde::Serialize;

use procura_core::{DomainError, DomainResult, OrderId, Price, UserId};
use procura_orders::Order;

use super::Marketplace;

/// A placed order with its computed total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub total: Price,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        let total = order.total();
        Self { order, total }
    }
}

impl Marketplace {
    /// The user's placed orders, most recently placed first. The basket is
    /// not included.
    pub fn list_orders(&self, user: UserId) -> DomainResult<Vec<OrderView>> {
        self.store.read(|t| {
            let mut orders: Vec<_> = t
                .orders
                .values()
                .filter(|o| o.user == user && !o.is_basket())
                .cloned()
                .collect();
            let placed = |o: &Order| o.confirmed_at.unwrap_or(o.created_at);
            orders.sort_by(|a, b| placed(b).cmp(&placed(a)).then(b.id.cmp(&a.id)));
            Ok(orders.into_iter().map(OrderView::from).collect())
        })
    }

    /// One of the user's placed orders; other users' orders are reported missing.
    pub fn get_order(&self, user: UserId, order_id: OrderId) -> DomainResult<OrderView> {
        self.store.read(|t| {
            t.orders
                .get(&order_id)
                .filter(|o| o.user == user && !o.is_basket())
                .cloned()
                .map(OrderView::from)
                .ok_or_else(|| DomainError::not_found(format!("order {order_id}")))
        })
    }
}
