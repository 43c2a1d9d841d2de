//! `procura-auth`: pure authentication/authorization boundary.
//!
//! This crate is decoupled from HTTP and storage: it turns verified tokens
//! into a [`Principal`] and answers policy questions about it.

pub mod authorize;
pub mod claims;
pub mod principal;
pub mod profile;

pub use authorize::{AuthzError, can_change_order_status, ensure_shop_owner, require_supplier};
pub use claims::{Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use principal::{Principal, UserType};
pub use profile::UserProfile;
