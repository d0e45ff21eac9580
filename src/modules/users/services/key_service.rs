use std::sync::Arc;

use tracing::info;

use crate::core::{AppError, AuthStateStore, Result};
use crate::modules::users::repositories::UserRepository;

/// API key lifecycle for signed-in users
pub struct KeyService {
    users: Arc<dyn UserRepository>,
    store: Arc<AuthStateStore>,
}

impl KeyService {
    pub fn new(users: Arc<dyn UserRepository>, store: Arc<AuthStateStore>) -> Self {
        Self { users, store }
    }

    /// Deactivate a key in the user store, then drop it from the auth cache
    pub async fn revoke(&self, user_id: &str, key_digest: &str) -> Result<()> {
        if !self.users.deactivate_key(user_id, key_digest).await? {
            return Err(AppError::not_found("API key not found"));
        }

        self.store.revoke_key(key_digest);
        info!(user_id = user_id, "API key revoked");
        Ok(())
    }
}
