use procura_auth::{Principal, UserType};
use procura_core::UserId;

/// Principal context for a request (authenticated identity).
///
/// Inserted by the auth middleware; every protected handler receives it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn user_type(&self) -> UserType {
        self.principal.user_type
    }
}
