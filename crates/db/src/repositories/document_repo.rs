//! PostgreSQL repository for the `documents` table.
//!
//! Every write runs in a transaction together with the matching
//! `categories.document_count` adjustment, so a count can never drift from
//! the number of documents referencing its category.

use async_trait::async_trait;
use medirec_core::error::CoreError;
use medirec_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use super::DocumentRepository;
use crate::error::map_sqlx_error;
use crate::models::document::{CreateDocument, Document, DocumentSummary, UpdateDocument};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, category_id, title, file_name, mime_type, size_bytes, \
                        file_data, content_date, notes, created_at, updated_at";

/// Provides document persistence on PostgreSQL.
pub struct PgDocumentRepo {
    pool: PgPool,
}

impl PgDocumentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Increment a category's count, requiring it to belong to `user_id`.
async fn increment_count(
    conn: &mut PgConnection,
    category_id: DbId,
    user_id: DbId,
) -> Result<(), CoreError> {
    let result = sqlx::query(
        "UPDATE categories SET document_count = document_count + 1
         WHERE id = $1 AND user_id = $2",
    )
    .bind(category_id)
    .bind(user_id)
    .execute(conn)
    .await
    .map_err(map_sqlx_error)?;

    if result.rows_affected() == 0 {
        return Err(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        });
    }
    Ok(())
}

async fn decrement_count(conn: &mut PgConnection, category_id: DbId) -> Result<(), CoreError> {
    sqlx::query(
        "UPDATE categories SET document_count = GREATEST(document_count - 1, 0)
         WHERE id = $1",
    )
    .bind(category_id)
    .execute(conn)
    .await
    .map_err(map_sqlx_error)?;
    Ok(())
}

#[async_trait]
impl DocumentRepository for PgDocumentRepo {
    async fn create(&self, input: &CreateDocument) -> Result<Document, CoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        increment_count(&mut tx, input.category_id, input.user_id).await?;

        let query = format!(
            "INSERT INTO documents
                (user_id, category_id, title, file_name, mime_type, size_bytes,
                 file_data, content_date, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        let document = sqlx::query_as::<_, Document>(&query)
            .bind(input.user_id)
            .bind(input.category_id)
            .bind(&input.title)
            .bind(&input.file.file_name)
            .bind(&input.file.mime_type)
            .bind(input.file.size_bytes)
            .bind(&input.file.encoded)
            .bind(input.content_date)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(document)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Document>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_for_user(
        &self,
        user_id: DbId,
        category_id: Option<DbId>,
    ) -> Result<Vec<DocumentSummary>, CoreError> {
        sqlx::query_as::<_, DocumentSummary>(
            "SELECT d.id, d.user_id, d.category_id, c.name AS category_name, d.title,
                    d.file_name, d.mime_type, d.size_bytes, d.content_date, d.notes,
                    d.created_at
             FROM documents d
             JOIN categories c ON c.id = d.category_id
             WHERE d.user_id = $1
               AND ($2::BIGINT IS NULL OR d.category_id = $2)
             ORDER BY d.content_date DESC, d.id DESC",
        )
        .bind(user_id)
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn update(
        &self,
        id: DbId,
        input: &UpdateDocument,
    ) -> Result<Option<Document>, CoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1 FOR UPDATE");
        let Some(existing) = sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
        else {
            return Ok(None);
        };

        if let Some(new_category) = input.category_id {
            if new_category != existing.category_id {
                increment_count(&mut tx, new_category, existing.user_id).await?;
                decrement_count(&mut tx, existing.category_id).await?;
            }
        }

        let query = format!(
            "UPDATE documents SET
                category_id = COALESCE($2, category_id),
                title = COALESCE($3, title),
                content_date = COALESCE($4, content_date),
                notes = CASE WHEN $6 THEN $5 ELSE notes END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(input.category_id)
            .bind(&input.title)
            .bind(input.content_date)
            .bind(input.notes.as_ref().and_then(|notes| notes.as_deref()))
            .bind(input.notes.is_some())
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: DbId) -> Result<bool, CoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let category_id: Option<DbId> =
            sqlx::query_scalar("DELETE FROM documents WHERE id = $1 RETURNING category_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;

        let Some(category_id) = category_id else {
            return Ok(false);
        };
        decrement_count(&mut tx, category_id).await?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(true)
    }
}
