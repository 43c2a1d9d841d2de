use serde::{Deserialize, Serialize};

use procura_core::{DomainError, DomainResult, UserId};

use crate::UserType;

/// Display data about an account that the credential layer does not carry.
///
/// Only used to address and greet users in notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    pub user_type: UserType,
}

impl UserProfile {
    pub fn validate(&self) -> DomainResult<()> {
        let email = self.email.trim();
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !well_formed {
            return Err(DomainError::invalid_input(format!(
                "'{}' is not a valid email address",
                self.email
            )));
        }
        Ok(())
    }

    /// Name used in greetings; falls back to the email address.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}
