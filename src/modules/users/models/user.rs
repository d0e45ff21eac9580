use chrono::NaiveDateTime;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::FromRow;

use crate::core::Principal;

/// Ledger owner
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    /// Falls back to the email's local part, then "User"
    pub fn resolved_display_name(&self) -> String {
        if !self.display_name.trim().is_empty() {
            return self.display_name.clone();
        }
        self.email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .filter(|local| !local.is_empty())
            .unwrap_or("User")
            .to_string()
    }

    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.id.clone(),
            display_name: self.resolved_display_name(),
        }
    }
}

/// Hex SHA-256 of a raw API key. Only digests are stored or cached.
pub fn key_digest(api_key: &str) -> String {
    hex::encode(Sha256::digest(api_key.as_bytes()))
}
