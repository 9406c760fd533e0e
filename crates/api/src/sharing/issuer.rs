use std::sync::Arc;

use chrono::Utc;
use medirec_core::error::CoreError;
use medirec_core::sharing::{expiry_from, generate_share_token, is_expired, log_prefix};
use medirec_core::types::DbId;
use medirec_db::models::share_token::{CreateShareToken, ShareToken};
use medirec_db::repositories::{
    DocumentRepository, Repositories, ShareTokenRepository, UserRepository,
};

/// Mints share tokens for a patient.
///
/// A user has at most one live token. Issuing a new one supersedes the
/// previous token in the same repository call, so there is no window in
/// which both resolve.
pub struct TokenIssuer {
    users: Arc<dyn UserRepository>,
    documents: Arc<dyn DocumentRepository>,
    tokens: Arc<dyn ShareTokenRepository>,
    ttl_days: i64,
}

impl TokenIssuer {
    pub fn new(repos: &Repositories, ttl_days: i64) -> Self {
        Self {
            users: repos.users.clone(),
            documents: repos.documents.clone(),
            tokens: repos.share_tokens.clone(),
            ttl_days,
        }
    }

    /// Issue a fresh token for `user_id`, revoking any live one.
    ///
    /// `document_id`, when given, must name one of the user's own documents.
    pub async fn issue(
        &self,
        user_id: DbId,
        document_id: Option<DbId>,
    ) -> Result<ShareToken, CoreError> {
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "User",
                id: user_id,
            });
        }

        if let Some(doc_id) = document_id {
            let owned = self
                .documents
                .find_by_id(doc_id)
                .await?
                .is_some_and(|doc| doc.user_id == user_id);
            if !owned {
                return Err(CoreError::Validation(format!(
                    "Document {doc_id} does not belong to user {user_id}"
                )));
            }
        }

        let input = CreateShareToken {
            user_id,
            token: generate_share_token(),
            expires_at: Some(expiry_from(Utc::now(), self.ttl_days)),
            document_id,
        };
        let token = self.tokens.replace_for_user(&input).await?;

        tracing::info!(
            user_id,
            token_prefix = log_prefix(&token.token),
            expires_at = ?token.expires_at,
            "Share token issued"
        );
        Ok(token)
    }

    /// Return the user's live, unexpired token, issuing one if there is none.
    pub async fn current_or_issue(&self, user_id: DbId) -> Result<ShareToken, CoreError> {
        if let Some(existing) = self.tokens.find_live_for_user(user_id).await? {
            if !is_expired(existing.expires_at, Utc::now()) {
                return Ok(existing);
            }
            tracing::debug!(
                user_id,
                token_prefix = log_prefix(&existing.token),
                "Live share token expired, issuing a new one"
            );
        }
        self.issue(user_id, None).await
    }

    /// Revoke the user's live token. Returns `true` if one was revoked.
    pub async fn revoke(&self, user_id: DbId) -> Result<bool, CoreError> {
        let revoked = self.tokens.revoke_for_user(user_id).await? > 0;
        if revoked {
            tracing::info!(user_id, "Share token revoked");
        }
        Ok(revoked)
    }
}
