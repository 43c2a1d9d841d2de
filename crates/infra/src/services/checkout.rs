use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{info, warn};

use procura_core::{ContactId, DomainError, DomainResult, UserId};
use procura_orders::{Audience, LineSnapshot, Order, OrderEvent};

use super::Marketplace;

impl Marketplace {
    /// Turn the user's basket into a placed order, reserving stock.
    ///
    /// One atomic unit: either every line is reserved and the order is `new`,
    /// or nothing changed. Concurrent checkouts are serialized by the store,
    /// so the second one sees the first one's reservations.
    pub fn confirm(&self, user: UserId, contact: ContactId) -> DomainResult<Order> {
        let (order, confirmed, audience) = self.store.transaction(|t| {
            let contact = t.contact_of(user, contact)?.clone();

            let basket = t
                .basket_of(user)
                .cloned()
                .ok_or_else(|| DomainError::invalid_input("basket is empty"))?;
            if basket.items.is_empty() {
                return Err(DomainError::invalid_input("basket is empty"));
            }

            // Validate every line before touching any stock.
            let mut snapshots = BTreeMap::new();
            for line in &basket.items {
                let record = t.stock_record(line.stock_record)?;
                let product = t.product(record.product)?;
                let shop = t.shop(record.shop)?;

                if !shop.is_active {
                    return Err(DomainError::invalid_input(format!(
                        "shop '{}' is not accepting orders",
                        shop.name
                    )));
                }
                if !record.can_reserve(line.quantity) {
                    return Err(DomainError::insufficient_stock(product.name.clone()));
                }

                snapshots.insert(
                    line.stock_record,
                    LineSnapshot {
                        product_name: product.name.clone(),
                        shop_name: shop.name.clone(),
                        unit_price: record.price,
                    },
                );
            }

            for line in &basket.items {
                let product_name = snapshots
                    .get(&line.stock_record)
                    .map(|s| s.product_name.clone())
                    .unwrap_or_default();
                t.stock_record_mut(line.stock_record)?
                    .reserve(line.quantity)
                    .map_err(|_| DomainError::insufficient_stock(product_name))?;
            }

            let order = t.order_mut(basket.id)?;
            let confirmed = order.confirm(contact.id, snapshots, Utc::now())?;
            let order = order.clone();
            t.baskets.remove(&user);

            let audience = Audience {
                buyer_email: t.email_of(user).map(str::to_string),
                admin_email: self.admin_email.clone(),
                address: Some(contact.address_line()),
                phone: Some(contact.phone.clone()),
            };
            Ok((order, confirmed, audience))
        })?;

        info!(
            user_id = %user,
            order_id = %order.id,
            lines = confirmed.line_count,
            total = %confirmed.total,
            "order confirmed"
        );

        if audience.admin_email.is_none() {
            warn!(order_id = %order.id, "no admin email configured, admin alert will not be delivered");
        }
        self.publish(OrderEvent::from(confirmed), audience);

        Ok(order)
    }
}
