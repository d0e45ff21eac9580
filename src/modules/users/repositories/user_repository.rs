use async_trait::async_trait;
use sqlx::MySqlPool;
use uuid::Uuid;

use crate::core::{AppError, Principal, Result};
use crate::modules::users::models::User;

/// Identity lookups for API key authentication
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Resolve an active API key digest to its owner
    async fn find_principal_by_key_digest(&self, key_digest: &str) -> Result<Option<Principal>>;

    /// Stamp last use of a key; failures are not fatal to the request
    async fn record_key_use(&self, key_digest: &str) -> Result<()>;

    /// Create the user and key if the key is unknown. Returns the owning user id.
    async fn ensure_user_with_key(&self, display_name: &str, key_digest: &str) -> Result<String>;

    /// Mark one of the user's keys inactive. Returns false when no active key matched.
    async fn deactivate_key(&self, user_id: &str, key_digest: &str) -> Result<bool>;
}

pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_principal_by_key_digest(&self, key_digest: &str) -> Result<Option<Principal>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.display_name, u.email, u.created_at, u.updated_at
            FROM api_keys k
            JOIN users u ON u.id = k.user_id
            WHERE k.key_hash = ? AND k.is_active = TRUE
            LIMIT 1
            "#,
        )
        .bind(key_digest)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user.map(|u| u.principal()))
    }

    async fn record_key_use(&self, key_digest: &str) -> Result<()> {
        sqlx::query("UPDATE api_keys SET last_used_at = NOW(6) WHERE key_hash = ?")
            .bind(key_digest)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn ensure_user_with_key(&self, display_name: &str, key_digest: &str) -> Result<String> {
        // Revoked keys still own their row, so look up regardless of is_active
        let existing: Option<String> =
            sqlx::query_scalar("SELECT user_id FROM api_keys WHERE key_hash = ? LIMIT 1")
                .bind(key_digest)
                .fetch_optional(&self.pool)
                .await?;
        if let Some(user_id) = existing {
            return Ok(user_id);
        }

        let mut tx = self.pool.begin().await
            .map_err(|e| AppError::Internal(format!("Failed to start transaction: {}", e)))?;

        let user_id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO users (id, display_name) VALUES (?, ?)")
            .bind(&user_id)
            .bind(display_name)
            .execute(tx.as_mut())
            .await?;

        sqlx::query("INSERT INTO api_keys (id, user_id, key_hash) VALUES (?, ?, ?)")
            .bind(Uuid::new_v4().to_string())
            .bind(&user_id)
            .bind(key_digest)
            .execute(tx.as_mut())
            .await?;

        tx.commit().await
            .map_err(|e| AppError::Internal(format!("Failed to commit transaction: {}", e)))?;

        tracing::info!(user_id = %user_id, "Bootstrapped user with API key");
        Ok(user_id)
    }

    async fn deactivate_key(&self, user_id: &str, key_digest: &str) -> Result<bool> {
        let rows_affected = sqlx::query(
            "UPDATE api_keys SET is_active = FALSE WHERE key_hash = ? AND user_id = ? AND is_active = TRUE",
        )
        .bind(key_digest)
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}
