//! PostgreSQL repository for the `share_tokens` table.

use async_trait::async_trait;
use medirec_core::error::CoreError;
use medirec_core::types::DbId;
use sqlx::PgPool;

use super::ShareTokenRepository;
use crate::error::map_sqlx_error;
use crate::models::share_token::{CreateShareToken, ShareToken};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token, expires_at, document_id, is_revoked, created_at";

/// Provides share token persistence on PostgreSQL.
pub struct PgShareTokenRepo {
    pool: PgPool,
}

impl PgShareTokenRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareTokenRepository for PgShareTokenRepo {
    async fn find_live_for_user(&self, user_id: DbId) -> Result<Option<ShareToken>, CoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM share_tokens
             WHERE user_id = $1 AND is_revoked = false"
        );
        sqlx::query_as::<_, ShareToken>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<ShareToken>, CoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM share_tokens
             WHERE token = $1 AND is_revoked = false"
        );
        sqlx::query_as::<_, ShareToken>(&query)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn replace_for_user(&self, input: &CreateShareToken) -> Result<ShareToken, CoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // Row lock on the owner serializes concurrent issuance for one user:
        // the second transaction waits, then revokes the first one's token.
        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(input.user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        if locked.is_none() {
            return Err(CoreError::NotFound {
                entity: "User",
                id: input.user_id,
            });
        }

        let revoked = sqlx::query(
            "UPDATE share_tokens SET is_revoked = true
             WHERE user_id = $1 AND is_revoked = false",
        )
        .bind(input.user_id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let query = format!(
            "INSERT INTO share_tokens (user_id, token, expires_at, document_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let token = sqlx::query_as::<_, ShareToken>(&query)
            .bind(input.user_id)
            .bind(&input.token)
            .bind(input.expires_at)
            .bind(input.document_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        tracing::debug!(
            user_id = input.user_id,
            revoked = revoked.rows_affected(),
            "Share token replaced"
        );
        Ok(token)
    }

    async fn revoke_for_user(&self, user_id: DbId) -> Result<u64, CoreError> {
        let result = sqlx::query(
            "UPDATE share_tokens SET is_revoked = true
             WHERE user_id = $1 AND is_revoked = false",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }
}
