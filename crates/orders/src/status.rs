use core::str::FromStr;
use serde::{Deserialize, Serialize};

use procura_core::{DomainError, DomainResult};

/// Lifecycle status of an order.
///
/// ```text
/// basket ──confirm──▶ new ─▶ confirmed ─▶ assembled ─▶ sent ─▶ delivered
///                      │         │            │          │
///                      └─────────┴────────────┴──────────┴──▶ canceled
/// ```
///
/// `basket` is only left through checkout; `delivered` and `canceled` are terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Basket,
    New,
    Confirmed,
    Assembled,
    Sent,
    Delivered,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Basket,
        OrderStatus::New,
        OrderStatus::Confirmed,
        OrderStatus::Assembled,
        OrderStatus::Sent,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Basket => "basket",
            OrderStatus::New => "new",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Assembled => "assembled",
            OrderStatus::Sent => "sent",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Canceled => "canceled",
        }
    }

    /// Statuses an operator may move an order to from `self`.
    pub fn allowed_next(&self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            // Checkout is the only way out of the basket.
            Basket => &[],
            New => &[Confirmed, Canceled],
            Confirmed => &[Assembled, Canceled],
            Assembled => &[Sent, Canceled],
            Sent => &[Delivered, Canceled],
            Delivered | Canceled => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Canceled)
    }

    /// Whether stock is still held for an order in this status.
    pub fn holds_stock(&self) -> bool {
        matches!(
            self,
            OrderStatus::New | OrderStatus::Confirmed | OrderStatus::Assembled | OrderStatus::Sent
        )
    }

    pub fn ensure_transition(&self, next: OrderStatus) -> DomainResult<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(DomainError::IllegalTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| DomainError::InvalidStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tokens_parse_exactly() {
        for st in OrderStatus::ALL {
            assert_eq!(st.as_str().parse::<OrderStatus>().unwrap(), st);
        }
        assert_eq!(
            "teleported".parse::<OrderStatus>(),
            Err(DomainError::InvalidStatus("teleported".into()))
        );
        assert!("Delivered".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn happy_path_is_linear() {
        let path = [
            OrderStatus::New,
            OrderStatus::Confirmed,
            OrderStatus::Assembled,
            OrderStatus::Sent,
            OrderStatus::Delivered,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn delivered_cannot_be_reopened() {
        let err = OrderStatus::Delivered
            .ensure_transition(OrderStatus::New)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::IllegalTransition {
                from: "delivered".into(),
                to: "new".into()
            }
        );
    }

    fn any_status() -> impl Strategy<Value = OrderStatus> {
        proptest::sample::select(OrderStatus::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn transition_table_invariants(from in any_status(), to in any_status()) {
            let allowed = from.can_transition_to(to);
            // Never re-enter the basket, never stay in place, never leave a terminal state.
            if to == OrderStatus::Basket || from == to || from.is_terminal() {
                prop_assert!(!allowed);
            }
            // Leaving the basket happens only at checkout.
            if from == OrderStatus::Basket {
                prop_assert!(!allowed);
            }
            // Every live order can be canceled.
            if from.holds_stock() && to == OrderStatus::Canceled {
                prop_assert!(allowed);
            }
            prop_assert_eq!(allowed, from.ensure_transition(to).is_ok());
        }
    }
}
