//! Subject and body rendering per notification kind.

use procura_events::notification::keys;
use procura_events::{Notification, NotificationKind};

use super::mail::Mail;

/// Render the mail for `notification`.
///
/// `None` when the payload names no recipient (e.g. a buyer without a
/// profile); such notifications are dropped, not retried.
pub fn render(notification: &Notification, from: &str) -> Option<Mail> {
    let field = |key: &str| notification.get(key).unwrap_or("");
    let order_id = field(keys::ORDER_ID);

    let (to, subject, body) = match notification.kind {
        NotificationKind::UserRegistered => (
            notification.get(keys::EMAIL)?,
            "Welcome to Procura".to_string(),
            format!(
                "Hello, {name}!\n\nYour account has been created.\nEmail: {email}\n",
                name = field(keys::NAME),
                email = field(keys::EMAIL),
            ),
        ),
        NotificationKind::OrderConfirmed => (
            notification.get(keys::EMAIL)?,
            format!("Your order #{order_id} has been accepted"),
            format!(
                "Your order #{order_id} has been placed.\n\nItems: {lines}\nTotal: {total}\nDelivery to: {address}\nPhone: {phone}\n\nWe will contact you to confirm the details.\n",
                lines = field(keys::LINE_COUNT),
                total = field(keys::TOTAL),
                address = field(keys::ADDRESS),
                phone = field(keys::PHONE),
            ),
        ),
        NotificationKind::OrderStatusChanged => (
            notification.get(keys::EMAIL)?,
            format!("Order #{order_id}: {}", field(keys::NEW_STATUS)),
            format!(
                "The status of your order #{order_id} changed from '{old}' to '{new}'.\n",
                old = field(keys::OLD_STATUS),
                new = field(keys::NEW_STATUS),
            ),
        ),
        NotificationKind::OrderPlacedAdminAlert => (
            notification.get(keys::ADMIN_EMAIL)?,
            format!("New order #{order_id}"),
            format!(
                "Order #{order_id} was placed by {buyer}.\n\nItems: {lines}\nTotal: {total}\nDelivery to: {address}\n",
                buyer = notification
                    .get(keys::EMAIL)
                    .unwrap_or_else(|| field(keys::USER_ID)),
                lines = field(keys::LINE_COUNT),
                total = field(keys::TOTAL),
                address = field(keys::ADDRESS),
            ),
        ),
    };

    if to.trim().is_empty() {
        return None;
    }

    Some(Mail {
        from: from.to_string(),
        to: to.to_string(),
        subject,
        body,
    })
}
