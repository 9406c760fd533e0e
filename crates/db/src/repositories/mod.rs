//! Repository layer.
//!
//! Each table is reached through an async trait so the API layer does not
//! care where the data lives. Two implementations exist:
//!
//! - `Pg*Repo` structs in this module, backed by a PostgreSQL pool.
//! - [`MemoryStore`](crate::memory::MemoryStore), one struct implementing
//!   every trait over process memory (tests, demos, no-database setups).
//!
//! [`Repositories`] bundles one trait object per table and is what the
//! application state holds.

pub mod category_repo;
pub mod document_repo;
pub mod medical_condition_repo;
pub mod share_token_repo;
pub mod user_repo;

use std::sync::Arc;

use async_trait::async_trait;
use medirec_core::error::CoreError;
use medirec_core::types::DbId;

use crate::memory::MemoryStore;
use crate::models::category::{Category, CreateCategory};
use crate::models::document::{CreateDocument, Document, DocumentSummary, UpdateDocument};
use crate::models::medical_condition::MedicalCondition;
use crate::models::share_token::{CreateShareToken, ShareToken};
use crate::models::user::{CreateUser, User};
use crate::DbPool;

pub use category_repo::PgCategoryRepo;
pub use document_repo::PgDocumentRepo;
pub use medical_condition_repo::PgMedicalConditionRepo;
pub use share_token_repo::PgShareTokenRepo;
pub use user_repo::PgUserRepo;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Access to the `users` table.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. A duplicate username yields `Conflict`.
    async fn create(&self, input: &CreateUser) -> Result<User, CoreError>;

    /// Insert a user together with its starter categories as one unit of
    /// work. Any failure leaves neither the user nor a category behind.
    async fn create_with_categories(
        &self,
        input: &CreateUser,
        category_names: &[&str],
    ) -> Result<(User, Vec<Category>), CoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, CoreError>;

    /// Find a user by username (case-sensitive).
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, CoreError>;

    /// List users with the given role, ordered by display name.
    async fn list_by_role(&self, role: &str) -> Result<Vec<User>, CoreError>;

    /// Total number of users. Used to decide whether to seed demo data.
    async fn count(&self) -> Result<i64, CoreError>;
}

/// Access to the `categories` table.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Insert a category with a zero count. A duplicate name for the same
    /// user yields `Conflict`.
    async fn create(&self, input: &CreateCategory) -> Result<Category, CoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Category>, CoreError>;

    /// List a user's categories ordered by name.
    async fn list_for_user(&self, user_id: DbId) -> Result<Vec<Category>, CoreError>;
}

/// Access to the `documents` table.
///
/// Every mutating method keeps `categories.document_count` in step within
/// the same unit of work.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a document and increment its category count. The category must
    /// belong to the same user, otherwise `NotFound { entity: "Category" }`.
    async fn create(&self, input: &CreateDocument) -> Result<Document, CoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Document>, CoreError>;

    /// List a user's documents, newest content date first, optionally
    /// restricted to one category.
    async fn list_for_user(
        &self,
        user_id: DbId,
        category_id: Option<DbId>,
    ) -> Result<Vec<DocumentSummary>, CoreError>;

    /// Apply an update. Returns `None` if the document does not exist.
    async fn update(
        &self,
        id: DbId,
        input: &UpdateDocument,
    ) -> Result<Option<Document>, CoreError>;

    /// Delete a document and decrement its category count. Returns `true` if
    /// a row was deleted.
    async fn delete(&self, id: DbId) -> Result<bool, CoreError>;
}

/// Access to the `share_tokens` table.
#[async_trait]
pub trait ShareTokenRepository: Send + Sync {
    /// The user's live (non-revoked) token, expired or not.
    async fn find_live_for_user(&self, user_id: DbId) -> Result<Option<ShareToken>, CoreError>;

    /// Exact-match lookup among live tokens. Revoked tokens are invisible.
    async fn find_by_token(&self, token: &str) -> Result<Option<ShareToken>, CoreError>;

    /// Revoke the user's live token (if any) and insert `input` as one
    /// atomic step. When this returns, the previous token no longer resolves.
    /// A missing user yields `NotFound { entity: "User" }`.
    async fn replace_for_user(&self, input: &CreateShareToken) -> Result<ShareToken, CoreError>;

    /// Revoke the user's live token without a replacement. Returns the number
    /// of tokens revoked (0 or 1).
    async fn revoke_for_user(&self, user_id: DbId) -> Result<u64, CoreError>;
}

/// Access to the `medical_conditions` table.
#[async_trait]
pub trait MedicalConditionRepository: Send + Sync {
    async fn find_for_user(&self, user_id: DbId) -> Result<Option<MedicalCondition>, CoreError>;

    /// Create or replace the user's summary, stamping `last_updated`.
    async fn upsert(&self, user_id: DbId, summary: &str) -> Result<MedicalCondition, CoreError>;
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// Which storage backend a [`Repositories`] bundle talks to.
#[derive(Clone)]
pub enum StorageBackend {
    Postgres(DbPool),
    Memory,
}

/// One trait object per table. Cheap to clone.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub documents: Arc<dyn DocumentRepository>,
    pub share_tokens: Arc<dyn ShareTokenRepository>,
    pub conditions: Arc<dyn MedicalConditionRepository>,
    pub backend: StorageBackend,
}

impl Repositories {
    /// Repositories backed by a PostgreSQL pool.
    pub fn postgres(pool: DbPool) -> Self {
        Self {
            users: Arc::new(PgUserRepo::new(pool.clone())),
            categories: Arc::new(PgCategoryRepo::new(pool.clone())),
            documents: Arc::new(PgDocumentRepo::new(pool.clone())),
            share_tokens: Arc::new(PgShareTokenRepo::new(pool.clone())),
            conditions: Arc::new(PgMedicalConditionRepo::new(pool.clone())),
            backend: StorageBackend::Postgres(pool),
        }
    }

    /// Repositories backed by a fresh, empty in-memory store.
    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    /// Repositories sharing an existing in-memory store.
    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            categories: store.clone(),
            documents: store.clone(),
            share_tokens: store.clone(),
            conditions: store,
            backend: StorageBackend::Memory,
        }
    }

    /// Short backend name for logs and the health endpoint.
    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            StorageBackend::Postgres(_) => "postgres",
            StorageBackend::Memory => "memory",
        }
    }

    /// Verify the backend is reachable. The in-memory store always is.
    pub async fn health_check(&self) -> Result<(), CoreError> {
        match &self.backend {
            StorageBackend::Postgres(pool) => crate::health_check(pool)
                .await
                .map_err(crate::error::map_sqlx_error),
            StorageBackend::Memory => Ok(()),
        }
    }
}
