use thiserror::Error;

use procura_core::{DomainError, UserId};

use crate::Principal;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("only staff or suppliers may change order status")]
    NotStaffOrSupplier,

    #[error("only suppliers may manage a shop catalog")]
    NotSupplier,

    #[error("shop '{shop}' belongs to another user")]
    NotShopOwner { shop: String },
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        DomainError::forbidden(value.to_string())
    }
}

/// Order status edits are reserved to staff and supplier accounts.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn can_change_order_status(principal: &Principal) -> Result<(), AuthzError> {
    if principal.is_staff || principal.is_supplier() {
        Ok(())
    } else {
        Err(AuthzError::NotStaffOrSupplier)
    }
}

/// Catalog uploads and the shop on/off switch require a supplier account.
pub fn require_supplier(principal: &Principal) -> Result<(), AuthzError> {
    if principal.is_supplier() {
        Ok(())
    } else {
        Err(AuthzError::NotSupplier)
    }
}

/// A supplier may only touch its own shop.
pub fn ensure_shop_owner(
    principal: &Principal,
    shop_name: &str,
    owner: UserId,
) -> Result<(), AuthzError> {
    require_supplier(principal)?;
    if owner == principal.user_id {
        Ok(())
    } else {
        Err(AuthzError::NotShopOwner {
            shop: shop_name.to_string(),
        })
    }
}
