use tracing::info;

use procura_core::{ContactId, DomainError, DomainResult, UserId};
use procura_orders::{Contact, ContactDraft};

use super::Marketplace;

impl Marketplace {
    pub fn add_contact(&self, user: UserId, draft: ContactDraft) -> DomainResult<Contact> {
        let contact = Contact::create(user, draft)?;
        self.store.transaction(|t| {
            t.contacts.insert(contact.id, contact.clone());
            Ok(())
        })?;
        Ok(contact)
    }

    pub fn list_contacts(&self, user: UserId) -> DomainResult<Vec<Contact>> {
        self.store.read(|t| {
            let mut contacts: Vec<_> = t
                .contacts
                .values()
                .filter(|c| c.user == user)
                .cloned()
                .collect();
            contacts.sort_by_key(|c| c.id);
            Ok(contacts)
        })
    }

    pub fn update_contact(
        &self,
        user: UserId,
        contact_id: ContactId,
        draft: ContactDraft,
    ) -> DomainResult<Contact> {
        self.store.transaction(|t| {
            t.contact_of(user, contact_id)?;
            let contact = t
                .contacts
                .get_mut(&contact_id)
                .ok_or_else(|| DomainError::not_found(format!("contact {contact_id}")))?;
            contact.update(draft)?;
            Ok(contact.clone())
        })
    }

    /// Delete a contact; orders that referenced it keep going without one.
    pub fn delete_contact(&self, user: UserId, contact_id: ContactId) -> DomainResult<()> {
        let detached = self.store.transaction(|t| {
            t.contact_of(user, contact_id)?;
            t.contacts.remove(&contact_id);

            Ok(t.orders
                .update_where(|o| o.contact == Some(contact_id), |o| o.contact = None))
        })?;

        info!(user_id = %user, contact_id = %contact_id, detached_orders = detached, "contact deleted");
        Ok(())
    }
}
