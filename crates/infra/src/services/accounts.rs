use tracing::info;

use procura_auth::UserProfile;
use procura_core::{DomainError, DomainResult, UserId};
use procura_events::notification::keys;
use procura_events::{Notification, NotificationKind};

use super::Marketplace;

impl Marketplace {
    /// Store a user's profile. The first registration sends a welcome mail.
    pub fn register_profile(&self, profile: UserProfile) -> DomainResult<UserProfile> {
        profile.validate()?;

        let is_new = self.store.transaction(|t| {
            let taken = t
                .profile_by_email(&profile.email)
                .is_some_and(|owner| owner != profile.user_id);
            if taken {
                return Err(DomainError::conflict(format!(
                    "email '{}' is already registered",
                    profile.email
                )));
            }
            Ok(t.put_profile(profile.clone()))
        })?;

        if is_new {
            info!(user_id = %profile.user_id, user_type = %profile.user_type, "user registered");
            self.emit(
                Notification::builder(NotificationKind::UserRegistered)
                    .field(keys::USER_ID, profile.user_id)
                    .field(keys::EMAIL, &profile.email)
                    .field(keys::NAME, profile.display_name())
                    .build(),
            );
        }
        Ok(profile)
    }

    pub fn profile(&self, user: UserId) -> DomainResult<UserProfile> {
        self.store.read(|t| {
            t.profiles
                .get(&user)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("profile of user {user}")))
        })
    }
}
