//! PostgreSQL repository tests. Each test gets a fresh database with the
//! crate's migrations applied. Run with `DATABASE_URL` set and `--ignored`.

use assert_matches::assert_matches;
use chrono::{NaiveDate, Utc};
use medirec_core::documents::FilePayload;
use medirec_core::error::CoreError;
use medirec_db::models::category::CreateCategory;
use medirec_db::models::document::{CreateDocument, UpdateDocument};
use medirec_db::models::share_token::CreateShareToken;
use medirec_db::models::user::{CreateUser, User};
use medirec_db::repositories::Repositories;
use sqlx::PgPool;

async fn user(repos: &Repositories, username: &str) -> User {
    repos
        .users
        .create(&CreateUser {
            username: username.to_string(),
            password_hash: "$argon2id$unused".to_string(),
            display_name: username.to_string(),
            role: "patient".to_string(),
            email: None,
        })
        .await
        .unwrap()
}

fn payload() -> FilePayload {
    FilePayload {
        file_name: "scan.pdf".to_string(),
        mime_type: "application/pdf".to_string(),
        size_bytes: 9,
        encoded: "JVBERi0xLjQK".to_string(),
    }
}

fn new_document(user_id: i64, category_id: i64) -> CreateDocument {
    CreateDocument {
        user_id,
        category_id,
        title: "Scan".to_string(),
        file: payload(),
        content_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        notes: None,
    }
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn duplicate_username_is_conflict(pool: PgPool) {
    let repos = Repositories::postgres(pool);
    user(&repos, "alice").await;

    let dup = repos
        .users
        .create(&CreateUser {
            username: "alice".to_string(),
            password_hash: "x".to_string(),
            display_name: "Alice again".to_string(),
            role: "patient".to_string(),
            email: None,
        })
        .await;
    assert_matches!(dup, Err(CoreError::Conflict(_)));
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn document_writes_maintain_counts(pool: PgPool) {
    let repos = Repositories::postgres(pool);
    let alice = user(&repos, "alice").await;
    let labs = repos
        .categories
        .create(&CreateCategory { user_id: alice.id, name: "Labs".into() })
        .await
        .unwrap();
    let scans = repos
        .categories
        .create(&CreateCategory { user_id: alice.id, name: "Scans".into() })
        .await
        .unwrap();

    let doc = repos.documents.create(&new_document(alice.id, labs.id)).await.unwrap();
    repos.documents.create(&new_document(alice.id, labs.id)).await.unwrap();

    repos
        .documents
        .update(
            doc.id,
            &UpdateDocument {
                category_id: Some(scans.id),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("document exists");
    assert!(repos.documents.delete(doc.id).await.unwrap());

    let counts: Vec<(String, i64)> = repos
        .categories
        .list_for_user(alice.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| (c.name, c.document_count))
        .collect();
    assert_eq!(counts, vec![("Labs".to_string(), 1), ("Scans".to_string(), 0)]);
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn foreign_category_is_rejected_without_side_effects(pool: PgPool) {
    let repos = Repositories::postgres(pool);
    let alice = user(&repos, "alice").await;
    let bob = user(&repos, "bob").await;
    let bobs = repos
        .categories
        .create(&CreateCategory { user_id: bob.id, name: "Labs".into() })
        .await
        .unwrap();

    let result = repos.documents.create(&new_document(alice.id, bobs.id)).await;
    assert_matches!(result, Err(CoreError::NotFound { entity: "Category", .. }));

    let bobs = repos.categories.find_by_id(bobs.id).await.unwrap().unwrap();
    assert_eq!(bobs.document_count, 0);
    assert!(repos.documents.list_for_user(alice.id, None).await.unwrap().is_empty());
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn replacing_a_token_revokes_the_previous_one(pool: PgPool) {
    let repos = Repositories::postgres(pool);
    let alice = user(&repos, "alice").await;

    let first = repos
        .share_tokens
        .replace_for_user(&CreateShareToken {
            user_id: alice.id,
            token: "first".into(),
            expires_at: Some(Utc::now()),
            document_id: None,
        })
        .await
        .unwrap();
    let second = repos
        .share_tokens
        .replace_for_user(&CreateShareToken {
            user_id: alice.id,
            token: "second".into(),
            expires_at: None,
            document_id: None,
        })
        .await
        .unwrap();

    assert!(repos.share_tokens.find_by_token(&first.token).await.unwrap().is_none());
    let live = repos.share_tokens.find_live_for_user(alice.id).await.unwrap();
    assert_eq!(live.map(|t| t.id), Some(second.id));

    assert_eq!(repos.share_tokens.revoke_for_user(alice.id).await.unwrap(), 1);
    assert_eq!(repos.share_tokens.revoke_for_user(alice.id).await.unwrap(), 0);
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn token_for_missing_user_is_not_found(pool: PgPool) {
    let repos = Repositories::postgres(pool);
    let result = repos
        .share_tokens
        .replace_for_user(&CreateShareToken {
            user_id: 404,
            token: "orphan".into(),
            expires_at: None,
            document_id: None,
        })
        .await;
    assert_matches!(result, Err(CoreError::NotFound { entity: "User", id: 404 }));
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn condition_upsert_replaces_summary(pool: PgPool) {
    let repos = Repositories::postgres(pool);
    let alice = user(&repos, "alice").await;

    let first = repos.conditions.upsert(alice.id, "Asthma").await.unwrap();
    let second = repos.conditions.upsert(alice.id, "Asthma, controlled").await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.summary, "Asthma, controlled");
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn user_with_categories_rolls_back_together(pool: PgPool) {
    let repos = Repositories::postgres(pool);
    let input = CreateUser {
        username: "pat".to_string(),
        password_hash: "x".to_string(),
        display_name: "Pat".to_string(),
        role: "patient".to_string(),
        email: None,
    };

    let failed = repos
        .users
        .create_with_categories(&input, &["Labs", "Labs"])
        .await;
    assert_matches!(failed, Err(CoreError::Conflict(_)));
    assert!(repos.users.find_by_username("pat").await.unwrap().is_none());

    let (user, categories) = repos
        .users
        .create_with_categories(&input, &["Labs", "Scans"])
        .await
        .unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(repos.categories.list_for_user(user.id).await.unwrap().len(), 2);
}
