//! Integration tests for the highlight repository.
//!
//! This test suite validates:
//! - Referent and hash verification on create
//! - Scoped listing by document and by file hash
//! - Partial update refreshing updated_at
//! - Highlight deletion leaving the linked vocab intact
//!
//! **IMPORTANT**: These tests require a fully migrated PostgreSQL database.
//! Run migrations first: `sqlx migrate run`

use uuid::Uuid;
use vocabase_db::{
    test_fixtures::{sample_position, TestDatabase},
    CreateHighlightRequest, Error, HighlightComment, HighlightRepository, HighlightScope,
    ListHighlightsRequest, PageRequest, Role, UpdateHighlightRequest, VocabRepository,
};

const HASH_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_create_rejects_stale_file_hash() {
    let mut test_db = TestDatabase::new().await;
    let user = test_db.create_user(Role::User).await;
    let document = test_db.create_document(user.id, HASH_A).await;
    let vocab = test_db.create_vocab(user.id, "anchor").await;

    let err = test_db
        .db
        .highlights
        .create(
            user.id,
            CreateHighlightRequest {
                vocab_id: vocab.id,
                document_id: document.id,
                file_hash: "deadbeef".to_string(),
                text: "passage".to_string(),
                position: sample_position(),
                comment: HighlightComment::default(),
                tags: vec![],
                source_tag: None,
            },
        )
        .await
        .expect_err("Stale hash must be rejected");
    assert!(matches!(err, Error::DocumentNotFound(_)));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_create_rejects_missing_referents() {
    let mut test_db = TestDatabase::new().await;
    let user = test_db.create_user(Role::User).await;
    let document = test_db.create_document(user.id, HASH_A).await;

    let err = test_db
        .db
        .highlights
        .create(
            user.id,
            CreateHighlightRequest {
                vocab_id: Uuid::new_v4(),
                document_id: document.id,
                file_hash: document.file_hash.clone(),
                text: "passage".to_string(),
                position: sample_position(),
                comment: HighlightComment::default(),
                tags: vec![],
                source_tag: None,
            },
        )
        .await
        .expect_err("Unknown vocab must be rejected");
    assert!(matches!(err, Error::VocabNotFound(_)));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_list_by_document_and_by_hash() {
    let mut test_db = TestDatabase::new().await;
    let user = test_db.create_user(Role::User).await;
    let document = test_db.create_document(user.id, HASH_A).await;
    let vocab = test_db.create_vocab(user.id, "anchor").await;

    test_db.create_highlight(user.id, vocab.id, &document).await;
    test_db.create_highlight(user.id, vocab.id, &document).await;

    let by_document = test_db
        .db
        .highlights
        .list(
            user.id,
            HighlightScope::Document(document.id),
            ListHighlightsRequest::default(),
            PageRequest::new(None, None, 50, 200),
        )
        .await
        .expect("Failed to list by document");
    assert_eq!(by_document.total, 2);

    let by_hash = test_db
        .db
        .highlights
        .list(
            user.id,
            HighlightScope::FileHash(HASH_A.to_string()),
            ListHighlightsRequest::default(),
            PageRequest::new(None, None, 50, 200),
        )
        .await
        .expect("Failed to list by hash");
    assert_eq!(by_hash.total, 2);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_update_refreshes_updated_at_and_keeps_position() {
    let mut test_db = TestDatabase::new().await;
    let user = test_db.create_user(Role::User).await;
    let document = test_db.create_document(user.id, HASH_A).await;
    let vocab = test_db.create_vocab(user.id, "anchor").await;
    let highlight = test_db.create_highlight(user.id, vocab.id, &document).await;

    let updated = test_db
        .db
        .highlights
        .update(
            highlight.id,
            user.id,
            UpdateHighlightRequest {
                comment: Some(HighlightComment {
                    text: "tricky usage".to_string(),
                    emoji: "📌".to_string(),
                }),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update highlight");

    assert_eq!(updated.comment.text, "tricky usage");
    assert!(updated.updated_at >= highlight.updated_at);
    // Position is persisted verbatim and never touched by updates.
    assert_eq!(updated.position, highlight.position);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_delete_highlight_keeps_vocab() {
    let mut test_db = TestDatabase::new().await;
    let user = test_db.create_user(Role::User).await;
    let document = test_db.create_document(user.id, HASH_A).await;
    let vocab = test_db.create_vocab(user.id, "anchor").await;
    let highlight = test_db.create_highlight(user.id, vocab.id, &document).await;

    test_db
        .db
        .highlights
        .delete(highlight.id, user.id)
        .await
        .expect("Failed to delete highlight");

    assert!(test_db
        .db
        .vocabs
        .find_by_id(vocab.id, user.id)
        .await
        .expect("lookup")
        .is_some());

    test_db.cleanup().await;
}
