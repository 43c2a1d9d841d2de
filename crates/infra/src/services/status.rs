use chrono::Utc;
use tracing::{info, warn};

use procura_auth::{Principal, can_change_order_status};
use procura_core::{DomainError, DomainResult, OrderId};
use procura_orders::{Audience, Order, OrderEvent, OrderStatus};

use super::Marketplace;

impl Marketplace {
    /// Move an order along its lifecycle.
    ///
    /// `expected`, when given, must match the current status (optimistic
    /// guard for two operators editing one order). Canceling an order puts
    /// its units back into stock in the same transaction.
    pub fn set_status(
        &self,
        actor: &Principal,
        order_id: OrderId,
        new_status: &str,
        expected: Option<&str>,
    ) -> DomainResult<Order> {
        can_change_order_status(actor)?;
        let next: OrderStatus = new_status.parse()?;
        let expected: Option<OrderStatus> = expected.map(str::parse::<OrderStatus>).transpose()?;

        let (order, changed, buyer_email) = self.store.transaction(|t| {
            let order = t.order_mut(order_id)?;
            if let Some(expected) = expected {
                if order.status != expected {
                    return Err(DomainError::conflict(format!(
                        "order {order_id} is {}, expected {expected}",
                        order.status
                    )));
                }
            }

            let changed = order.transition(next, actor.user_id, Utc::now())?;
            let order = order.clone();

            if next == OrderStatus::Canceled {
                for (stock_record, quantity) in order.restock_list() {
                    match t.stock.get_mut(&stock_record) {
                        Some(record) => record.release(quantity),
                        None => warn!(
                            order_id = %order_id,
                            stock_record_id = %stock_record,
                            quantity,
                            "stock record gone, skipping restock"
                        ),
                    }
                }
            }

            let buyer_email = t.email_of(order.user).map(str::to_string);
            Ok((order, changed, buyer_email))
        })?;

        info!(
            order_id = %order_id,
            from = %changed.from,
            to = %changed.to,
            changed_by = %actor.user_id,
            "order status changed"
        );

        self.publish(
            OrderEvent::from(changed),
            Audience {
                buyer_email,
                ..Audience::default()
            },
        );

        Ok(order)
    }
}
