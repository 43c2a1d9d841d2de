use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use procura_core::{ContactId, OrderId, Price, UserId};
use procura_events::notification::keys;
use procura_events::{Event, Notification, NotificationKind};

use crate::OrderStatus;

/// Event: a basket became a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmed {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub contact_id: ContactId,
    pub total: Price,
    pub line_count: usize,
    pub occurred_at: DateTime<Utc>,
}

/// Event: an operator moved an order along its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub changed_by: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    Confirmed(OrderConfirmed),
    StatusChanged(OrderStatusChanged),
}

impl From<OrderConfirmed> for OrderEvent {
    fn from(value: OrderConfirmed) -> Self {
        OrderEvent::Confirmed(value)
    }
}

impl From<OrderStatusChanged> for OrderEvent {
    fn from(value: OrderStatusChanged) -> Self {
        OrderEvent::StatusChanged(value)
    }
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Confirmed(_) => "orders.order.confirmed",
            OrderEvent::StatusChanged(_) => "orders.order.status_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::Confirmed(e) => e.occurred_at,
            OrderEvent::StatusChanged(e) => e.occurred_at,
        }
    }
}

/// Who hears about an order event, read alongside the change it reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Audience {
    pub buyer_email: Option<String>,
    pub admin_email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl OrderEvent {
    pub fn order_id(&self) -> OrderId {
        match self {
            OrderEvent::Confirmed(e) => e.order_id,
            OrderEvent::StatusChanged(e) => e.order_id,
        }
    }

    /// Notifications announcing this event, in emission order.
    ///
    /// A confirmation yields the buyer's mail followed by the admin alert;
    /// the alert is produced even without an admin address.
    pub fn notifications(&self, audience: &Audience) -> Vec<Notification> {
        let base = |kind: NotificationKind| {
            Notification::builder(kind)
                .occurred_at(self.occurred_at())
                .field(keys::EVENT, self.event_type())
                .field(keys::ORDER_ID, self.order_id())
        };

        match self {
            OrderEvent::Confirmed(e) => vec![
                base(NotificationKind::OrderConfirmed)
                    .field(keys::USER_ID, e.user_id)
                    .field_opt(keys::EMAIL, audience.buyer_email.as_deref())
                    .field(keys::TOTAL, e.total)
                    .field(keys::LINE_COUNT, e.line_count)
                    .field_opt(keys::ADDRESS, audience.address.as_deref())
                    .field_opt(keys::PHONE, audience.phone.as_deref())
                    .build(),
                base(NotificationKind::OrderPlacedAdminAlert)
                    .field(keys::USER_ID, e.user_id)
                    .field_opt(keys::ADMIN_EMAIL, audience.admin_email.as_deref())
                    .field_opt(keys::EMAIL, audience.buyer_email.as_deref())
                    .field(keys::TOTAL, e.total)
                    .field(keys::LINE_COUNT, e.line_count)
                    .field_opt(keys::ADDRESS, audience.address.as_deref())
                    .build(),
            ],
            OrderEvent::StatusChanged(e) => vec![
                base(NotificationKind::OrderStatusChanged)
                    .field(keys::USER_ID, e.user_id)
                    .field_opt(keys::EMAIL, audience.buyer_email.as_deref())
                    .field(keys::OLD_STATUS, e.from)
                    .field(keys::NEW_STATUS, e.to)
                    .build(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirmed() -> OrderConfirmed {
        OrderConfirmed {
            order_id: OrderId::new(),
            user_id: UserId::new(),
            contact_id: ContactId::new(),
            total: Price::ZERO,
            line_count: 2,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn confirmation_notifies_buyer_then_admin() {
        let event = OrderEvent::from(confirmed());
        let audience = Audience {
            buyer_email: Some("buyer@example.com".into()),
            admin_email: Some("admin@procura.local".into()),
            address: Some("Москва, Тверская 1".into()),
            phone: Some("+7 900 000 00 00".into()),
        };

        let sent = event.notifications(&audience);
        let kinds: Vec<_> = sent.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![NotificationKind::OrderConfirmed, NotificationKind::OrderPlacedAdminAlert]
        );
        assert_eq!(sent[0].get(keys::EMAIL), Some("buyer@example.com"));
        assert_eq!(sent[0].get(keys::LINE_COUNT), Some("2"));
        assert_eq!(sent[1].get(keys::ADMIN_EMAIL), Some("admin@procura.local"));
        assert_eq!(sent[1].get(keys::EVENT), Some("orders.order.confirmed"));
        assert!(sent.iter().all(|n| n.occurred_at == event.occurred_at()));
    }

    #[test]
    fn admin_alert_is_produced_without_an_admin_address() {
        let sent = OrderEvent::from(confirmed()).notifications(&Audience::default());
        assert_eq!(sent.len(), 2);
        assert!(sent[1].get(keys::ADMIN_EMAIL).is_none());
    }

    #[test]
    fn status_change_carries_both_statuses() {
        let event = OrderEvent::from(OrderStatusChanged {
            order_id: OrderId::new(),
            user_id: UserId::new(),
            from: OrderStatus::New,
            to: OrderStatus::Confirmed,
            changed_by: UserId::new(),
            occurred_at: Utc::now(),
        });

        let sent = event.notifications(&Audience::default());
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::OrderStatusChanged);
        assert_eq!(sent[0].get(keys::OLD_STATUS), Some("new"));
        assert_eq!(sent[0].get(keys::NEW_STATUS), Some("confirmed"));
        assert_eq!(sent[0].get(keys::ORDER_ID), Some(event.order_id().to_string().as_str()));
    }
}
