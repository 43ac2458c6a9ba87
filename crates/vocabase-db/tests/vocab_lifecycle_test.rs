//! Integration tests for the vocabulary repository.
//!
//! This test suite validates:
//! - Create, read, update, delete of vocabulary entries
//! - Word normalization to lowercase
//! - Search, tag, and source filtering with pagination
//! - Review history append and statistics aggregation
//!
//! **IMPORTANT**: These tests require a fully migrated PostgreSQL database.
//! Run migrations first: `sqlx migrate run`

use vocabase_db::{
    test_fixtures::TestDatabase, CreateVocabRequest, Error, ListVocabsRequest, PageRequest, Role,
    SourceKind, Timeframe, UpdateVocabRequest, VocabRepository,
};

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_vocab_crud_lifecycle() {
    let mut test_db = TestDatabase::new().await;
    let user = test_db.create_user(Role::User).await;

    let created = test_db
        .db
        .vocabs
        .insert(
            user.id,
            CreateVocabRequest {
                word: "  Ephemeral ".to_string(),
                meaning: "lasting a very short time".to_string(),
                pronunciation_url: None,
                tags: vec!["gre".to_string()],
                source: None,
                source_type: SourceKind::Slf,
                examples: vec!["an ephemeral stream".to_string()],
            },
        )
        .await
        .expect("Failed to create vocab");

    // Word is trimmed and lowercased on insert.
    assert_eq!(created.word, "ephemeral");
    assert!(created.review_history.is_empty());

    let fetched = test_db
        .db
        .vocabs
        .find_by_id(created.id, user.id)
        .await
        .expect("Failed to fetch vocab")
        .expect("Vocab not found");
    assert_eq!(fetched.meaning, "lasting a very short time");

    let updated = test_db
        .db
        .vocabs
        .update(
            created.id,
            user.id,
            UpdateVocabRequest {
                meaning: Some("short-lived".to_string()),
                tags: Some(vec!["gre".to_string(), "common".to_string()]),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update vocab");
    assert_eq!(updated.meaning, "short-lived");
    assert_eq!(updated.tags.len(), 2);
    // The word itself is immutable.
    assert_eq!(updated.word, "ephemeral");

    test_db
        .db
        .vocabs
        .delete(created.id, user.id)
        .await
        .expect("Failed to delete vocab");

    let gone = test_db
        .db
        .vocabs
        .find_by_id(created.id, user.id)
        .await
        .expect("Failed to re-fetch vocab");
    assert!(gone.is_none());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_vocab_list_is_owner_scoped_and_filtered() {
    let mut test_db = TestDatabase::new().await;
    let alice = test_db.create_user(Role::User).await;
    let bob = test_db.create_user(Role::User).await;

    test_db.create_vocab(alice.id, "serendipity").await;
    test_db.create_vocab(alice.id, "sonder").await;
    test_db.create_vocab(bob.id, "serendipity").await;

    let page = test_db
        .db
        .vocabs
        .list(
            alice.id,
            ListVocabsRequest {
                search: Some("seren".to_string()),
                ..Default::default()
            },
            PageRequest::new(None, None, 20, 200),
        )
        .await
        .expect("Failed to list vocabs");

    // Bob's identically-worded entry must not leak into Alice's listing.
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].user_id, alice.id);

    let tagged = test_db
        .db
        .vocabs
        .list(
            alice.id,
            ListVocabsRequest {
                tags: Some(vec!["fixture".to_string(), "nonexistent".to_string()]),
                ..Default::default()
            },
            PageRequest::new(None, None, 20, 200),
        )
        .await
        .expect("Failed to list by tags");
    // Any-of semantics: matching one tag in the filter is enough.
    assert_eq!(tagged.total, 2);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_review_appends_and_stats_aggregate() {
    let mut test_db = TestDatabase::new().await;
    let user = test_db.create_user(Role::User).await;

    let vocab = test_db.create_vocab(user.id, "palimpsest").await;

    let after_first = test_db
        .db
        .vocabs
        .add_review(vocab.id, user.id, true)
        .await
        .expect("Failed to record review");
    assert_eq!(after_first.review_history.len(), 1);
    assert!(after_first.review_history[0].correct);

    let after_second = test_db
        .db
        .vocabs
        .add_review(vocab.id, user.id, false)
        .await
        .expect("Failed to record second review");
    assert_eq!(after_second.review_history.len(), 2);

    let stats = test_db
        .db
        .vocabs
        .stats(user.id, Timeframe::All)
        .await
        .expect("Failed to aggregate stats");
    assert_eq!(stats.total, 1);
    assert_eq!(stats.total_reviews, 2);
    assert_eq!(stats.avg_reviews_per_vocab, 2.0);
    assert_eq!(stats.by_source_type.get("self"), Some(&1));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_mutations_on_foreign_vocab_read_as_not_found() {
    let mut test_db = TestDatabase::new().await;
    let alice = test_db.create_user(Role::User).await;
    let bob = test_db.create_user(Role::User).await;

    let vocab = test_db.create_vocab(alice.id, "private").await;

    let err = test_db
        .db
        .vocabs
        .add_review(vocab.id, bob.id, true)
        .await
        .expect_err("Foreign review must fail");
    assert!(matches!(err, Error::VocabNotFound(_)));

    let err = test_db
        .db
        .vocabs
        .delete(vocab.id, bob.id)
        .await
        .expect_err("Foreign delete must fail");
    assert!(matches!(err, Error::VocabNotFound(_)));

    test_db.cleanup().await;
}
