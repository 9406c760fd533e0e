//! PostgreSQL repository for the `medical_conditions` table.

use async_trait::async_trait;
use medirec_core::error::CoreError;
use medirec_core::types::DbId;
use sqlx::PgPool;

use super::MedicalConditionRepository;
use crate::error::map_sqlx_error;
use crate::models::medical_condition::MedicalCondition;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, summary, last_updated";

/// Provides medical condition persistence on PostgreSQL.
pub struct PgMedicalConditionRepo {
    pool: PgPool,
}

impl PgMedicalConditionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MedicalConditionRepository for PgMedicalConditionRepo {
    async fn find_for_user(&self, user_id: DbId) -> Result<Option<MedicalCondition>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM medical_conditions WHERE user_id = $1");
        sqlx::query_as::<_, MedicalCondition>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn upsert(&self, user_id: DbId, summary: &str) -> Result<MedicalCondition, CoreError> {
        let query = format!(
            "INSERT INTO medical_conditions (user_id, summary)
             VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET
                summary = EXCLUDED.summary,
                last_updated = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MedicalCondition>(&query)
            .bind(user_id)
            .bind(summary)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}
