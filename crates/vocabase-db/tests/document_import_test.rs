//! Integration tests for document import and cascade deletion.
//!
//! This test suite validates:
//! - Per-owner dedup by content hash
//! - Independent records for the same hash under different owners
//! - Cascade deletion of sourced vocabs and highlights, by id and by hash
//! - Document statistics and the per-user overview
//!
//! **IMPORTANT**: These tests require a fully migrated PostgreSQL database.
//! Run migrations first: `sqlx migrate run`

use vocabase_db::{
    test_fixtures::TestDatabase, CreateVocabRequest, DocumentRepository, Error,
    HighlightRepository, Role, SourceKind, Timeframe, VocabRepository,
};

const HASH_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const HASH_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_reimport_by_same_owner_returns_existing() {
    let mut test_db = TestDatabase::new().await;
    let user = test_db.create_user(Role::User).await;

    let first = test_db
        .db
        .documents
        .import(user.id, HASH_A, "paper.pdf")
        .await
        .expect("Failed to import document");
    assert!(!first.is_existing);

    let second = test_db
        .db
        .documents
        .import(user.id, HASH_A, "renamed.pdf")
        .await
        .expect("Failed to re-import document");
    assert!(second.is_existing);
    // The original record is returned untouched, original name included.
    assert_eq!(second.document.id, first.document.id);
    assert_eq!(second.document.file_name, "paper.pdf");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_same_hash_different_owners_stay_independent() {
    let mut test_db = TestDatabase::new().await;
    let alice = test_db.create_user(Role::User).await;
    let bob = test_db.create_user(Role::User).await;

    let alices = test_db
        .db
        .documents
        .import(alice.id, HASH_A, "paper.pdf")
        .await
        .expect("Failed to import for alice");

    let bobs = test_db
        .db
        .documents
        .import(bob.id, HASH_A, "paper.pdf")
        .await
        .expect("Failed to import for bob");

    assert!(!bobs.is_existing);
    assert_ne!(bobs.document.id, alices.document.id);
    assert!(bobs.message.contains("other users"));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_delete_cascade_removes_sourced_vocabs_and_highlights() {
    let mut test_db = TestDatabase::new().await;
    let user = test_db.create_user(Role::User).await;

    let document = test_db.create_document(user.id, HASH_A).await;

    // A vocab sourced from the document, plus one entered by hand.
    let sourced = test_db
        .db
        .vocabs
        .insert(
            user.id,
            CreateVocabRequest {
                word: "anchor".to_string(),
                meaning: "from the document".to_string(),
                pronunciation_url: None,
                tags: vec![],
                source: Some(document.id.to_string()),
                source_type: SourceKind::Document,
                examples: vec![],
            },
        )
        .await
        .expect("Failed to create sourced vocab");
    let manual = test_db.create_vocab(user.id, "standalone").await;

    let highlight = test_db
        .create_highlight(user.id, sourced.id, &document)
        .await;

    test_db
        .db
        .documents
        .delete_cascade(document.id, user.id)
        .await
        .expect("Failed to delete document");

    assert!(test_db
        .db
        .vocabs
        .find_by_id(sourced.id, user.id)
        .await
        .expect("lookup")
        .is_none());
    assert!(test_db
        .db
        .highlights
        .find_by_id(highlight.id, user.id)
        .await
        .expect("lookup")
        .is_none());
    // Hand-entered vocab is untouched.
    assert!(test_db
        .db
        .vocabs
        .find_by_id(manual.id, user.id)
        .await
        .expect("lookup")
        .is_some());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_delete_foreign_document_reads_as_not_found() {
    let mut test_db = TestDatabase::new().await;
    let alice = test_db.create_user(Role::User).await;
    let bob = test_db.create_user(Role::User).await;

    let document = test_db.create_document(alice.id, HASH_A).await;

    let err = test_db
        .db
        .documents
        .delete_cascade(document.id, bob.id)
        .await
        .expect_err("Foreign delete must fail");
    assert!(matches!(err, Error::DocumentNotFound(_)));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_delete_by_hash_cascades_for_target_owner() {
    let mut test_db = TestDatabase::new().await;
    let user = test_db.create_user(Role::User).await;
    let document = test_db.create_document(user.id, HASH_A).await;

    let sourced = test_db
        .db
        .vocabs
        .insert(
            user.id,
            CreateVocabRequest {
                word: "anchor".to_string(),
                meaning: "from the document".to_string(),
                pronunciation_url: None,
                tags: vec![],
                source: Some(document.id.to_string()),
                source_type: SourceKind::Document,
                examples: vec![],
            },
        )
        .await
        .expect("Failed to create sourced vocab");

    test_db
        .db
        .documents
        .delete_cascade_by_hash(HASH_A, user.id)
        .await
        .expect("Failed to delete by hash");

    assert!(test_db
        .db
        .documents
        .find_by_id(document.id, user.id)
        .await
        .expect("lookup")
        .is_none());
    assert!(test_db
        .db
        .vocabs
        .find_by_id(sourced.id, user.id)
        .await
        .expect("lookup")
        .is_none());

    let err = test_db
        .db
        .documents
        .delete_cascade_by_hash(HASH_A, user.id)
        .await
        .expect_err("Missing document must fail");
    assert!(matches!(err, Error::NotFound(_)));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_overview_rolls_up_per_owner() {
    let mut test_db = TestDatabase::new().await;
    let alice = test_db.create_user(Role::User).await;
    let bob = test_db.create_user(Role::User).await;

    let doc_a = test_db.create_document(alice.id, HASH_A).await;
    test_db.create_document(alice.id, HASH_B).await;
    test_db.create_document(bob.id, HASH_A).await;

    let vocab = test_db.create_vocab(alice.id, "rollup").await;
    test_db.create_highlight(alice.id, vocab.id, &doc_a).await;

    let overview = test_db
        .db
        .documents
        .overview()
        .await
        .expect("Failed to build overview");

    let alice_row = overview
        .iter()
        .find(|r| r.user_id == alice.id)
        .expect("alice missing from overview");
    let bob_row = overview
        .iter()
        .find(|r| r.user_id == bob.id)
        .expect("bob missing from overview");

    assert_eq!(alice_row.total_documents, 2);
    assert_eq!(alice_row.total_highlights, 1);
    assert_eq!(alice_row.email, alice.email);
    assert_eq!(bob_row.total_documents, 1);
    assert_eq!(bob_row.total_highlights, 0);

    // Sorted by document count descending, so alice precedes bob.
    let pos = |id| overview.iter().position(|r| r.user_id == id).unwrap();
    assert!(pos(alice.id) < pos(bob.id));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_document_stats_counts_within_window() {
    let mut test_db = TestDatabase::new().await;
    let user = test_db.create_user(Role::User).await;

    test_db.create_document(user.id, HASH_A).await;

    let stats = test_db
        .db
        .documents
        .stats(user.id, Timeframe::Week)
        .await
        .expect("Failed to aggregate stats");
    assert_eq!(stats.total_documents, 1);
    assert_eq!(stats.timeframe, Timeframe::Week);
    // Imported just now, so today's bucket must be present.
    assert_eq!(stats.recent_activity.len(), 1);
    assert_eq!(stats.recent_activity[0].documents_added, 1);

    test_db.cleanup().await;
}
