//! In-memory implementation of every repository trait.
//!
//! All tables live behind a single async mutex, so each trait method is one
//! critical section. That gives the same atomicity the PostgreSQL
//! repositories get from transactions: a document write and its category
//! count change, or a token revocation and its replacement, are observed
//! together or not at all. Ids start at 1 and increase per table, matching
//! `BIGSERIAL` on a fresh database.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use medirec_core::error::CoreError;
use medirec_core::types::DbId;
use tokio::sync::Mutex;

use crate::models::category::{Category, CreateCategory};
use crate::models::document::{CreateDocument, Document, DocumentSummary, UpdateDocument};
use crate::models::medical_condition::MedicalCondition;
use crate::models::share_token::{CreateShareToken, ShareToken};
use crate::models::user::{CreateUser, User};
use crate::repositories::{
    CategoryRepository, DocumentRepository, MedicalConditionRepository, ShareTokenRepository,
    UserRepository,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<DbId, User>,
    categories: BTreeMap<DbId, Category>,
    documents: BTreeMap<DbId, Document>,
    share_tokens: BTreeMap<DbId, ShareToken>,
    conditions: BTreeMap<DbId, MedicalCondition>,
    next_user_id: DbId,
    next_category_id: DbId,
    next_document_id: DbId,
    next_share_token_id: DbId,
    next_condition_id: DbId,
}

fn next_id(counter: &mut DbId) -> DbId {
    *counter += 1;
    *counter
}

fn duplicate_category_name() -> CoreError {
    CoreError::Conflict("Duplicate value violates unique constraint: uq_categories_user_name".into())
}

impl Tables {
    fn category_name(&self, id: DbId) -> Option<String> {
        self.categories.get(&id).map(|c| c.name.clone())
    }

    /// Increment a category's count, requiring it to belong to `user_id`.
    fn increment_count(&mut self, category_id: DbId, user_id: DbId) -> Result<(), CoreError> {
        match self.categories.get_mut(&category_id) {
            Some(category) if category.user_id == user_id => {
                category.document_count += 1;
                Ok(())
            }
            _ => Err(CoreError::NotFound {
                entity: "Category",
                id: category_id,
            }),
        }
    }

    fn decrement_count(&mut self, category_id: DbId) {
        if let Some(category) = self.categories.get_mut(&category_id) {
            category.document_count = (category.document_count - 1).max(0);
        }
    }

    fn require_unique_username(&self, username: &str) -> Result<(), CoreError> {
        if self.users.values().any(|u| u.username == username) {
            return Err(CoreError::Conflict(
                "Duplicate value violates unique constraint: uq_users_username".into(),
            ));
        }
        Ok(())
    }

    fn insert_user(&mut self, input: &CreateUser) -> User {
        let user = User {
            id: next_id(&mut self.next_user_id),
            username: input.username.clone(),
            password_hash: input.password_hash.clone(),
            display_name: input.display_name.clone(),
            role: input.role.clone(),
            email: input.email.clone(),
            created_at: Utc::now(),
        };
        self.users.insert(user.id, user.clone());
        user
    }

    fn insert_category(&mut self, user_id: DbId, name: &str) -> Category {
        let category = Category {
            id: next_id(&mut self.next_category_id),
            user_id,
            name: name.to_string(),
            document_count: 0,
            created_at: Utc::now(),
        };
        self.categories.insert(category.id, category.clone());
        category
    }

    fn require_user(&self, user_id: DbId) -> Result<(), CoreError> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Referenced entity does not exist (user {user_id})"
            )))
        }
    }
}

/// Process-local store for tests, demos and database-less deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, input: &CreateUser) -> Result<User, CoreError> {
        let mut tables = self.tables.lock().await;
        tables.require_unique_username(&input.username)?;
        Ok(tables.insert_user(input))
    }

    async fn create_with_categories(
        &self,
        input: &CreateUser,
        category_names: &[&str],
    ) -> Result<(User, Vec<Category>), CoreError> {
        let mut tables = self.tables.lock().await;
        tables.require_unique_username(&input.username)?;
        // Checked up front so a failure consumes no ids and inserts nothing.
        for (i, name) in category_names.iter().enumerate() {
            if category_names[..i].contains(name) {
                return Err(duplicate_category_name());
            }
        }

        let user = tables.insert_user(input);
        let categories = category_names
            .iter()
            .map(|name| tables.insert_category(user.id, name))
            .collect();
        Ok((user, categories))
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, CoreError> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, CoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_by_role(&self, role: &str) -> Result<Vec<User>, CoreError> {
        let tables = self.tables.lock().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.display_name.cmp(&b.display_name).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn count(&self) -> Result<i64, CoreError> {
        Ok(self.tables.lock().await.users.len() as i64)
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn create(&self, input: &CreateCategory) -> Result<Category, CoreError> {
        let mut tables = self.tables.lock().await;
        tables.require_user(input.user_id)?;
        if tables
            .categories
            .values()
            .any(|c| c.user_id == input.user_id && c.name == input.name)
        {
            return Err(duplicate_category_name());
        }
        Ok(tables.insert_category(input.user_id, &input.name))
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Category>, CoreError> {
        Ok(self.tables.lock().await.categories.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: DbId) -> Result<Vec<Category>, CoreError> {
        let tables = self.tables.lock().await;
        let mut categories: Vec<Category> = tables
            .categories
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[async_trait]
impl DocumentRepository for MemoryStore {
    async fn create(&self, input: &CreateDocument) -> Result<Document, CoreError> {
        let mut tables = self.tables.lock().await;
        tables.increment_count(input.category_id, input.user_id)?;

        let now = Utc::now();
        let document = Document {
            id: next_id(&mut tables.next_document_id),
            user_id: input.user_id,
            category_id: input.category_id,
            title: input.title.clone(),
            file_name: input.file.file_name.clone(),
            mime_type: input.file.mime_type.clone(),
            size_bytes: input.file.size_bytes,
            file_data: input.file.encoded.clone(),
            content_date: input.content_date,
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Document>, CoreError> {
        Ok(self.tables.lock().await.documents.get(&id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: DbId,
        category_id: Option<DbId>,
    ) -> Result<Vec<DocumentSummary>, CoreError> {
        let tables = self.tables.lock().await;
        let mut summaries: Vec<DocumentSummary> = tables
            .documents
            .values()
            .filter(|d| d.user_id == user_id)
            .filter(|d| category_id.map_or(true, |c| d.category_id == c))
            .filter_map(|d| {
                tables
                    .category_name(d.category_id)
                    .map(|name| DocumentSummary::from_document(d, name))
            })
            .collect();
        summaries.sort_by(|a, b| {
            b.content_date
                .cmp(&a.content_date)
                .then(b.id.cmp(&a.id))
        });
        Ok(summaries)
    }

    async fn update(
        &self,
        id: DbId,
        input: &UpdateDocument,
    ) -> Result<Option<Document>, CoreError> {
        let mut tables = self.tables.lock().await;
        let Some(existing) = tables.documents.get(&id).cloned() else {
            return Ok(None);
        };

        if let Some(new_category) = input.category_id {
            if new_category != existing.category_id {
                tables.increment_count(new_category, existing.user_id)?;
                tables.decrement_count(existing.category_id);
            }
        }

        let mut updated = existing;
        if let Some(category_id) = input.category_id {
            updated.category_id = category_id;
        }
        if let Some(title) = &input.title {
            updated.title = title.clone();
        }
        if let Some(content_date) = input.content_date {
            updated.content_date = content_date;
        }
        if let Some(notes) = &input.notes {
            updated.notes = notes.clone();
        }
        updated.updated_at = Utc::now();

        tables.documents.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: DbId) -> Result<bool, CoreError> {
        let mut tables = self.tables.lock().await;
        let Some(document) = tables.documents.remove(&id) else {
            return Ok(false);
        };
        tables.decrement_count(document.category_id);
        for token in tables.share_tokens.values_mut() {
            if token.document_id == Some(id) {
                token.document_id = None;
            }
        }
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Share tokens
// ---------------------------------------------------------------------------

#[async_trait]
impl ShareTokenRepository for MemoryStore {
    async fn find_live_for_user(&self, user_id: DbId) -> Result<Option<ShareToken>, CoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .share_tokens
            .values()
            .find(|t| t.user_id == user_id && !t.is_revoked)
            .cloned())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<ShareToken>, CoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .share_tokens
            .values()
            .find(|t| t.token == token && !t.is_revoked)
            .cloned())
    }

    async fn replace_for_user(&self, input: &CreateShareToken) -> Result<ShareToken, CoreError> {
        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&input.user_id) {
            return Err(CoreError::NotFound {
                entity: "User",
                id: input.user_id,
            });
        }
        if tables.share_tokens.values().any(|t| t.token == input.token) {
            return Err(CoreError::Conflict(
                "Duplicate value violates unique constraint: uq_share_tokens_token".into(),
            ));
        }

        for token in tables.share_tokens.values_mut() {
            if token.user_id == input.user_id {
                token.is_revoked = true;
            }
        }

        let token = ShareToken {
            id: next_id(&mut tables.next_share_token_id),
            user_id: input.user_id,
            token: input.token.clone(),
            expires_at: input.expires_at,
            document_id: input.document_id,
            is_revoked: false,
            created_at: Utc::now(),
        };
        tables.share_tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn revoke_for_user(&self, user_id: DbId) -> Result<u64, CoreError> {
        let mut tables = self.tables.lock().await;
        let mut revoked = 0;
        for token in tables.share_tokens.values_mut() {
            if token.user_id == user_id && !token.is_revoked {
                token.is_revoked = true;
                revoked += 1;
            }
        }
        Ok(revoked)
    }
}

// ---------------------------------------------------------------------------
// Medical conditions
// ---------------------------------------------------------------------------

#[async_trait]
impl MedicalConditionRepository for MemoryStore {
    async fn find_for_user(&self, user_id: DbId) -> Result<Option<MedicalCondition>, CoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .conditions
            .values()
            .find(|c| c.user_id == user_id)
            .cloned())
    }

    async fn upsert(&self, user_id: DbId, summary: &str) -> Result<MedicalCondition, CoreError> {
        let mut tables = self.tables.lock().await;
        tables.require_user(user_id)?;

        let existing_id = tables
            .conditions
            .values()
            .find(|c| c.user_id == user_id)
            .map(|c| c.id);
        let id = match existing_id {
            Some(id) => id,
            None => next_id(&mut tables.next_condition_id),
        };

        let condition = MedicalCondition {
            id,
            user_id,
            summary: summary.to_string(),
            last_updated: Utc::now(),
        };
        tables.conditions.insert(id, condition.clone());
        Ok(condition)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
