//! PostgreSQL repository for the `users` table.

use async_trait::async_trait;
use medirec_core::error::CoreError;
use medirec_core::types::DbId;
use sqlx::PgPool;

use super::category_repo::COLUMNS as CATEGORY_COLUMNS;
use super::UserRepository;
use crate::error::map_sqlx_error;
use crate::models::category::Category;
use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, password_hash, display_name, role, email, created_at";

/// Provides user persistence on PostgreSQL.
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepo {
    async fn create(&self, input: &CreateUser) -> Result<User, CoreError> {
        let query = format!(
            "INSERT INTO users (username, password_hash, display_name, role, email)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.password_hash)
            .bind(&input.display_name)
            .bind(&input.role)
            .bind(&input.email)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn create_with_categories(
        &self,
        input: &CreateUser,
        category_names: &[&str],
    ) -> Result<(User, Vec<Category>), CoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let query = format!(
            "INSERT INTO users (username, password_hash, display_name, role, email)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.password_hash)
            .bind(&input.display_name)
            .bind(&input.role)
            .bind(&input.email)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let query = format!(
            "INSERT INTO categories (user_id, name)
             VALUES ($1, $2)
             RETURNING {CATEGORY_COLUMNS}"
        );
        let mut categories = Vec::with_capacity(category_names.len());
        for name in category_names {
            let category = sqlx::query_as::<_, Category>(&query)
                .bind(user.id)
                .bind(*name)
                .fetch_one(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
            categories.push(category);
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok((user, categories))
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_by_role(&self, role: &str) -> Result<Vec<User>, CoreError> {
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE role = $1 ORDER BY display_name, id");
        sqlx::query_as::<_, User>(&query)
            .bind(role)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn count(&self) -> Result<i64, CoreError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}
