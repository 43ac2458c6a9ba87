//! Integration tests for the user repository.
//!
//! This test suite validates:
//! - Case-insensitive email uniqueness and lookup
//! - Partial profile updates
//! - Soft deactivation and hard cascade deletion
//! - Per-account resource roll-up
//!
//! **IMPORTANT**: These tests require a fully migrated PostgreSQL database.
//! Run migrations first: `sqlx migrate run`

use uuid::Uuid;
use vocabase_db::{
    test_fixtures::TestDatabase, CreateUserRequest, Error, Role, UpdateUserRequest,
    UserRepository, VocabRepository,
};

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_email_uniqueness_is_case_insensitive() {
    let mut test_db = TestDatabase::new().await;
    let user = test_db.create_user(Role::User).await;

    let err = test_db
        .db
        .users
        .insert(CreateUserRequest {
            email: user.email.to_uppercase(),
            password_hash: "hash".to_string(),
            first_name: "Dup".to_string(),
            last_name: "User".to_string(),
            role: Role::User,
        })
        .await
        .expect_err("Duplicate email must be rejected");
    assert!(matches!(err, Error::Duplicate(_)));

    let found = test_db
        .db
        .users
        .find_by_email(&user.email.to_uppercase())
        .await
        .expect("Failed to look up by email")
        .expect("User not found by upper-cased email");
    assert_eq!(found.id, user.id);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_partial_update_leaves_other_fields() {
    let mut test_db = TestDatabase::new().await;
    let user = test_db.create_user(Role::User).await;

    let updated = test_db
        .db
        .users
        .update(
            user.id,
            UpdateUserRequest {
                first_name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update user");

    assert_eq!(updated.first_name, "Renamed");
    assert_eq!(updated.last_name, user.last_name);
    assert_eq!(updated.email, user.email);
    assert_eq!(updated.role, Role::User);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_deactivation_is_soft() {
    let mut test_db = TestDatabase::new().await;
    let user = test_db.create_user(Role::User).await;

    test_db
        .db
        .users
        .set_active(user.id, false)
        .await
        .expect("Failed to deactivate");

    let found = test_db
        .db
        .users
        .find_by_id(user.id)
        .await
        .expect("Failed to fetch user")
        .expect("Deactivated user must still exist");
    assert!(!found.is_active);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_delete_cascade_removes_owned_rows() {
    let mut test_db = TestDatabase::new().await;
    let user = test_db.create_user(Role::User).await;
    let vocab = test_db.create_vocab(user.id, "orphan").await;

    test_db
        .db
        .users
        .delete_cascade(user.id)
        .await
        .expect("Failed to delete user");

    assert!(test_db
        .db
        .users
        .find_by_id(user.id)
        .await
        .expect("lookup")
        .is_none());
    assert!(test_db
        .db
        .vocabs
        .find_by_id(vocab.id, user.id)
        .await
        .expect("lookup")
        .is_none());

    let err = test_db
        .db
        .users
        .delete_cascade(Uuid::new_v4())
        .await
        .expect_err("Unknown user must fail");
    assert!(matches!(err, Error::NotFound(_)));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires migrated database"]
async fn test_account_stats_count_owned_resources() {
    let mut test_db = TestDatabase::new().await;
    let user = test_db.create_user(Role::User).await;

    let document = test_db
        .create_document(
            user.id,
            "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
        )
        .await;
    let vocab = test_db.create_vocab(user.id, "tally").await;
    test_db.create_highlight(user.id, vocab.id, &document).await;

    let stats = test_db
        .db
        .users
        .stats(user.id)
        .await
        .expect("Failed to aggregate account stats");
    assert_eq!(stats.total_vocabulary, 1);
    assert_eq!(stats.total_documents, 1);
    assert_eq!(stats.total_highlights, 1);
    assert_eq!(stats.joined_date, user.created_at);

    let err = test_db
        .db
        .users
        .stats(Uuid::new_v4())
        .await
        .expect_err("Unknown user must fail");
    assert!(matches!(err, Error::NotFound(_)));

    test_db.cleanup().await;
}
