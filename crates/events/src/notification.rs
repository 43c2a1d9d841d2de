//! Notification messages handed to the out-of-band delivery workers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use procura_core::DomainError;

/// Kind of lifecycle notification.
///
/// The string tokens are part of the queue contract and must not change.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    UserRegistered,
    OrderConfirmed,
    OrderStatusChanged,
    OrderPlacedAdminAlert,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 4] = [
        NotificationKind::UserRegistered,
        NotificationKind::OrderConfirmed,
        NotificationKind::OrderStatusChanged,
        NotificationKind::OrderPlacedAdminAlert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::UserRegistered => "user-registered",
            NotificationKind::OrderConfirmed => "order-confirmed",
            NotificationKind::OrderStatusChanged => "order-status-changed",
            NotificationKind::OrderPlacedAdminAlert => "order-placed-admin-alert",
        }
    }
}

impl core::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for NotificationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NotificationKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DomainError::invalid_input(format!("unknown notification kind '{s}'")))
    }
}

/// Payload keys shared by producers and the delivery side.
pub mod keys {
    pub const EVENT: &str = "event";
    pub const USER_ID: &str = "user_id";
    pub const EMAIL: &str = "email";
    pub const NAME: &str = "name";
    pub const ORDER_ID: &str = "order_id";
    pub const TOTAL: &str = "total";
    pub const LINE_COUNT: &str = "line_count";
    pub const ADDRESS: &str = "address";
    pub const PHONE: &str = "phone";
    pub const OLD_STATUS: &str = "old_status";
    pub const NEW_STATUS: &str = "new_status";
    pub const ADMIN_EMAIL: &str = "admin_email";
}

/// Flat string payload of a notification.
///
/// Only identifiers and display strings go in here; the delivery side never
/// reaches back into the transactional data.
pub type Payload = BTreeMap<String, String>;

/// A fire-and-forget message describing a lifecycle occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub payload: Payload,
    pub occurred_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(kind: NotificationKind, payload: Payload) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind,
            payload,
            occurred_at: Utc::now(),
        }
    }

    pub fn builder(kind: NotificationKind) -> NotificationBuilder {
        NotificationBuilder {
            kind,
            payload: Payload::new(),
            occurred_at: None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.payload.get(key).map(String::as_str)
    }
}

/// Fluent payload construction.
#[derive(Debug, Clone)]
pub struct NotificationBuilder {
    kind: NotificationKind,
    payload: Payload,
    occurred_at: Option<DateTime<Utc>>,
}

impl NotificationBuilder {
    pub fn field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.payload.insert(key.into(), value.to_string());
        self
    }

    pub fn field_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    /// Stamp the notification with the time of the occurrence it reports
    /// instead of the time it was built.
    pub fn occurred_at(mut self, at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(at);
        self
    }

    pub fn build(self) -> Notification {
        let mut notification = Notification::new(self.kind, self.payload);
        if let Some(at) = self.occurred_at {
            notification.occurred_at = at;
        }
        notification
    }
}
