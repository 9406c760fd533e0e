//! PostgreSQL repository for the `categories` table.
//!
//! Counts are never written here; see [`super::PgDocumentRepo`].

use async_trait::async_trait;
use medirec_core::error::CoreError;
use medirec_core::types::DbId;
use sqlx::PgPool;

use super::CategoryRepository;
use crate::error::map_sqlx_error;
use crate::models::category::{Category, CreateCategory};

/// Column list shared across queries to avoid repetition.
pub(super) const COLUMNS: &str = "id, user_id, name, document_count, created_at";

/// Provides category persistence on PostgreSQL.
pub struct PgCategoryRepo {
    pool: PgPool,
}

impl PgCategoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepo {
    async fn create(&self, input: &CreateCategory) -> Result<Category, CoreError> {
        let query = format!(
            "INSERT INTO categories (user_id, name)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(input.user_id)
            .bind(&input.name)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Category>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_for_user(&self, user_id: DbId) -> Result<Vec<Category>, CoreError> {
        let query =
            format!("SELECT {COLUMNS} FROM categories WHERE user_id = $1 ORDER BY name, id");
        sqlx::query_as::<_, Category>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}
