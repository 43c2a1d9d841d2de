use serde::{Deserialize, Serialize};

use procura_core::{ContactId, DomainError, DomainResult, UserId};

/// Delivery address and phone of a buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub user: UserId,
    pub city: String,
    pub street: String,
    pub house: String,
    pub building: String,
    pub apartment: String,
    pub phone: String,
}

/// User-supplied contact fields (create and full update).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    pub city: String,
    pub street: String,
    #[serde(default)]
    pub house: String,
    #[serde(default)]
    pub building: String,
    #[serde(default)]
    pub apartment: String,
    pub phone: String,
}

impl ContactDraft {
    pub fn validate(&self) -> DomainResult<()> {
        for (field, value) in [("city", &self.city), ("street", &self.street), ("phone", &self.phone)] {
            if value.trim().is_empty() {
                return Err(DomainError::invalid_input(format!("{field} is required")));
            }
        }
        Ok(())
    }
}

impl Contact {
    pub fn create(user: UserId, draft: ContactDraft) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self {
            id: ContactId::new(),
            user,
            city: draft.city,
            street: draft.street,
            house: draft.house,
            building: draft.building,
            apartment: draft.apartment,
            phone: draft.phone,
        })
    }

    pub fn update(&mut self, draft: ContactDraft) -> DomainResult<()> {
        draft.validate()?;
        self.city = draft.city;
        self.street = draft.street;
        self.house = draft.house;
        self.building = draft.building;
        self.apartment = draft.apartment;
        self.phone = draft.phone;
        Ok(())
    }

    /// One-line address used in notifications.
    pub fn address_line(&self) -> String {
        let mut parts = vec![self.city.as_str(), self.street.as_str()];
        parts.extend(
            [&self.house, &self.building, &self.apartment]
                .into_iter()
                .map(String::as_str)
                .filter(|s| !s.is_empty()),
        );
        parts.join(", ")
    }
}
