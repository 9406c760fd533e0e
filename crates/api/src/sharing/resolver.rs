use std::sync::Arc;

use chrono::Utc;
use medirec_core::error::CoreError;
use medirec_core::roles::ROLE_PATIENT;
use medirec_core::sharing::{
    is_demo_token, is_expired, log_prefix, normalize_presented, DEMO_PATIENT_USERNAME,
};
use medirec_core::types::{DbId, Timestamp};
use medirec_db::models::document::{Document, DocumentSummary};
use medirec_db::models::medical_condition::MedicalCondition;
use medirec_db::models::user::UserResponse;
use medirec_db::repositories::{
    DocumentRepository, MedicalConditionRepository, Repositories, ShareTokenRepository,
    UserRepository,
};
use serde::Serialize;

/// What a scanned QR code reveals: the owner and their records.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedRecord {
    pub user: UserResponse,
    pub documents: Vec<DocumentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<MedicalCondition>,
}

/// Resolves presented share tokens for unauthenticated readers.
///
/// Presented strings are never logged in full, only their first few
/// characters.
pub struct TokenResolver {
    users: Arc<dyn UserRepository>,
    documents: Arc<dyn DocumentRepository>,
    tokens: Arc<dyn ShareTokenRepository>,
    conditions: Arc<dyn MedicalConditionRepository>,
    demo_tokens_enabled: bool,
}

impl TokenResolver {
    pub fn new(repos: &Repositories, demo_tokens_enabled: bool) -> Self {
        Self {
            users: repos.users.clone(),
            documents: repos.documents.clone(),
            tokens: repos.share_tokens.clone(),
            conditions: repos.conditions.clone(),
            demo_tokens_enabled,
        }
    }

    /// Resolve a token to its owner's record as of now.
    pub async fn resolve(&self, token: &str) -> Result<SharedRecord, CoreError> {
        self.resolve_at(token, Utc::now()).await
    }

    /// Resolve a token as of `now`.
    pub async fn resolve_at(&self, token: &str, now: Timestamp) -> Result<SharedRecord, CoreError> {
        let user_id = self.authorize(token, now).await?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "User",
                id: user_id,
            })?;
        let documents = self.documents.list_for_user(user_id, None).await?;
        let condition = self.conditions.find_for_user(user_id).await?;

        Ok(SharedRecord {
            user: UserResponse::from(&user),
            documents,
            condition,
        })
    }

    /// Fetch one of the token owner's documents, payload included.
    ///
    /// A document belonging to anyone else is reported as not found.
    pub async fn resolve_document(
        &self,
        token: &str,
        document_id: DbId,
    ) -> Result<Document, CoreError> {
        let user_id = self.authorize(token, Utc::now()).await?;

        self.documents
            .find_by_id(document_id)
            .await?
            .filter(|doc| doc.user_id == user_id)
            .ok_or(CoreError::NotFound {
                entity: "Document",
                id: document_id,
            })
    }

    /// Map a presented token to the id of the user it grants access to.
    async fn authorize(&self, token: &str, now: Timestamp) -> Result<DbId, CoreError> {
        let Some(presented) = normalize_presented(token) else {
            tracing::debug!("Rejected malformed share token");
            return Err(CoreError::TokenNotFound);
        };

        match self.tokens.find_by_token(presented).await? {
            Some(record) => match record.expires_at {
                Some(expired_at) if is_expired(Some(expired_at), now) => {
                    tracing::info!(
                        user_id = record.user_id,
                        token_prefix = log_prefix(presented),
                        %expired_at,
                        "Expired share token presented"
                    );
                    Err(CoreError::TokenExpired { expired_at })
                }
                _ => {
                    tracing::debug!(
                        user_id = record.user_id,
                        token_prefix = log_prefix(presented),
                        "Share token resolved"
                    );
                    Ok(record.user_id)
                }
            },
            None => {
                if self.demo_tokens_enabled {
                    if let Some(user_id) = is_demo_token(presented) {
                        return self.authorize_demo(user_id).await;
                    }
                }
                tracing::info!(
                    token_prefix = log_prefix(presented),
                    "Unknown share token presented"
                );
                Err(CoreError::TokenNotFound)
            }
        }
    }

    /// Accept a demo token only while its target is still the seeded demo
    /// patient. Any other account at that id is never exposed.
    async fn authorize_demo(&self, user_id: DbId) -> Result<DbId, CoreError> {
        let is_demo_patient = self.users.find_by_id(user_id).await?.is_some_and(|user| {
            user.role == ROLE_PATIENT && user.username == DEMO_PATIENT_USERNAME
        });

        if is_demo_patient {
            tracing::info!(user_id, "Demo share token accepted");
            Ok(user_id)
        } else {
            tracing::warn!(user_id, "Demo share token refused: target is not the demo patient");
            Err(CoreError::TokenNotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Duration;
    use medirec_core::roles::ROLE_DOCTOR;
    use medirec_core::sharing::{DEFAULT_TOKEN_TTL_DAYS, MAX_PRESENTED_TOKEN_LEN};
    use medirec_db::models::share_token::CreateShareToken;
    use medirec_db::models::user::CreateUser;

    use super::*;
    use crate::sharing::test_support::{document, patient};
    use crate::sharing::TokenIssuer;

    #[tokio::test]
    async fn resolves_owner_documents_and_condition() {
        let repos = Repositories::in_memory();
        let alice = patient(&repos, "alice").await;
        let bob = patient(&repos, "bob").await;
        let alices_doc = document(&repos, alice.id, "bloodwork").await;
        document(&repos, bob.id, "xray").await;
        repos
            .conditions
            .upsert(alice.id, "Type 2 diabetes, controlled")
            .await
            .unwrap();

        let issuer = TokenIssuer::new(&repos, DEFAULT_TOKEN_TTL_DAYS);
        let token = issuer.issue(alice.id, None).await.unwrap();
        let record = TokenResolver::new(&repos, false)
            .resolve(&token.token)
            .await
            .unwrap();

        assert_eq!(record.user.id, alice.id);
        assert_eq!(record.documents.len(), 1);
        assert_eq!(record.documents[0].id, alices_doc.id);
        assert_eq!(
            record.condition.map(|c| c.summary),
            Some("Type 2 diabetes, controlled".to_string())
        );
    }

    #[tokio::test]
    async fn unknown_and_malformed_tokens_are_not_found() {
        let repos = Repositories::in_memory();
        let resolver = TokenResolver::new(&repos, false);

        assert_matches!(
            resolver.resolve("no-such-token").await,
            Err(CoreError::TokenNotFound)
        );
        assert_matches!(resolver.resolve("   ").await, Err(CoreError::TokenNotFound));
        let oversized = "a".repeat(MAX_PRESENTED_TOKEN_LEN + 1);
        assert_matches!(
            resolver.resolve(&oversized).await,
            Err(CoreError::TokenNotFound)
        );
    }

    #[tokio::test]
    async fn surrounding_whitespace_is_ignored() {
        let repos = Repositories::in_memory();
        let alice = patient(&repos, "alice").await;
        let token = TokenIssuer::new(&repos, DEFAULT_TOKEN_TTL_DAYS)
            .issue(alice.id, None)
            .await
            .unwrap();

        let padded = format!("  {}\n", token.token);
        let record = TokenResolver::new(&repos, false)
            .resolve(&padded)
            .await
            .unwrap();
        assert_eq!(record.user.id, alice.id);
    }

    #[tokio::test]
    async fn expiry_boundary_is_inclusive() {
        let repos = Repositories::in_memory();
        let alice = patient(&repos, "alice").await;
        let token = TokenIssuer::new(&repos, DEFAULT_TOKEN_TTL_DAYS)
            .issue(alice.id, None)
            .await
            .unwrap();
        let expires_at = token.expires_at.unwrap();
        let resolver = TokenResolver::new(&repos, false);

        assert!(resolver.resolve_at(&token.token, expires_at).await.is_ok());
        assert_matches!(
            resolver
                .resolve_at(&token.token, expires_at + Duration::seconds(1))
                .await,
            Err(CoreError::TokenExpired { expired_at }) if expired_at == expires_at
        );
    }

    #[tokio::test]
    async fn token_without_expiry_never_expires() {
        let repos = Repositories::in_memory();
        let alice = patient(&repos, "alice").await;
        repos
            .share_tokens
            .replace_for_user(&CreateShareToken {
                user_id: alice.id,
                token: "forever".to_string(),
                expires_at: None,
                document_id: None,
            })
            .await
            .unwrap();

        let far_future = Utc::now() + Duration::days(3650);
        let record = TokenResolver::new(&repos, false)
            .resolve_at("forever", far_future)
            .await
            .unwrap();
        assert_eq!(record.user.id, alice.id);
    }

    #[tokio::test]
    async fn demo_tokens_require_opt_in() {
        let repos = Repositories::in_memory();
        let demo = patient(&repos, DEMO_PATIENT_USERNAME).await;
        assert_eq!(demo.id, 1);

        assert_matches!(
            TokenResolver::new(&repos, false)
                .resolve("patient-qr-code")
                .await,
            Err(CoreError::TokenNotFound)
        );

        let enabled = TokenResolver::new(&repos, true);
        for demo_token in ["patient-qr-code", "patient-qr-code-1"] {
            let record = enabled.resolve(demo_token).await.unwrap();
            assert_eq!(record.user.id, demo.id);
        }
        assert_matches!(
            enabled.resolve("patient-qr-code-2").await,
            Err(CoreError::TokenNotFound)
        );
    }

    #[tokio::test]
    async fn demo_tokens_never_expose_other_accounts() {
        let enabled_demo = |repos: &Repositories| TokenResolver::new(repos, true);

        // Nothing seeded: id 1 does not exist.
        let repos = Repositories::in_memory();
        assert_matches!(
            enabled_demo(&repos).resolve("patient-qr-code").await,
            Err(CoreError::TokenNotFound)
        );

        // A real patient holds id 1.
        let repos = Repositories::in_memory();
        let alice = patient(&repos, "alice").await;
        assert_eq!(alice.id, 1);
        assert_matches!(
            enabled_demo(&repos).resolve("patient-qr-code").await,
            Err(CoreError::TokenNotFound)
        );

        // A doctor named like the demo patient holds id 1.
        let repos = Repositories::in_memory();
        let doctor = repos
            .users
            .create(&CreateUser {
                username: DEMO_PATIENT_USERNAME.to_string(),
                password_hash: "x".to_string(),
                display_name: "Impostor".to_string(),
                role: ROLE_DOCTOR.to_string(),
                email: None,
            })
            .await
            .unwrap();
        assert_eq!(doctor.id, 1);
        assert_matches!(
            enabled_demo(&repos).resolve("patient-qr-code-1").await,
            Err(CoreError::TokenNotFound)
        );
    }

    #[tokio::test]
    async fn document_download_is_scoped_to_owner() {
        let repos = Repositories::in_memory();
        let alice = patient(&repos, "alice").await;
        let bob = patient(&repos, "bob").await;
        let alices_doc = document(&repos, alice.id, "bloodwork").await;
        let bobs_doc = document(&repos, bob.id, "xray").await;
        let token = TokenIssuer::new(&repos, DEFAULT_TOKEN_TTL_DAYS)
            .issue(alice.id, None)
            .await
            .unwrap();
        let resolver = TokenResolver::new(&repos, false);

        let fetched = resolver
            .resolve_document(&token.token, alices_doc.id)
            .await
            .unwrap();
        assert_eq!(fetched.file_data, alices_doc.file_data);

        assert_matches!(
            resolver.resolve_document(&token.token, bobs_doc.id).await,
            Err(CoreError::NotFound { entity: "Document", .. })
        );
        assert_matches!(
            resolver.resolve_document("bogus", alices_doc.id).await,
            Err(CoreError::TokenNotFound)
        );
    }
}
