use core::str::FromStr;
use serde::{Deserialize, Serialize};

use procura_core::{DomainError, UserId};

/// Marketplace role of a user account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Supplier: owns a shop and uploads its catalog.
    Shop,
    /// Purchaser: fills a basket and places orders.
    Buyer,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Shop => "shop",
            UserType::Buyer => "buyer",
        }
    }
}

impl core::fmt::Display for UserType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shop" => Ok(UserType::Shop),
            "buyer" => Ok(UserType::Buyer),
            other => Err(DomainError::invalid_input(format!(
                "user type must be 'shop' or 'buyer' (got '{other}')"
            ))),
        }
    }
}

/// The authenticated actor of an operation.
///
/// Handed in by the credential layer and passed explicitly to every
/// operation that checks permissions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub user_type: UserType,
    pub is_staff: bool,
}

impl Principal {
    pub fn buyer(user_id: UserId) -> Self {
        Self {
            user_id,
            user_type: UserType::Buyer,
            is_staff: false,
        }
    }

    pub fn supplier(user_id: UserId) -> Self {
        Self {
            user_id,
            user_type: UserType::Shop,
            is_staff: false,
        }
    }

    pub fn staff(user_id: UserId) -> Self {
        Self {
            user_id,
            user_type: UserType::Buyer,
            is_staff: true,
        }
    }

    pub fn is_supplier(&self) -> bool {
        self.user_type == UserType::Shop
    }
}
