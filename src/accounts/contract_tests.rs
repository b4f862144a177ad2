//! Behaviour every `AccountStore` backend must share. Each backend's test
//! module runs these against its own store.

use crate::accounts::{AccountStore, ProfilePatch, StoreError};
use std::sync::Arc;
use std::time::Duration;

const CONTENDERS: usize = 8;

fn nickname(value: &str) -> ProfilePatch {
    ProfilePatch {
        nickname: Some(value.to_string()),
        comment: None,
    }
}

fn comment(value: &str) -> ProfilePatch {
    ProfilePatch {
        nickname: None,
        comment: Some(value.to_string()),
    }
}

pub async fn register_then_fetch(store: &dyn AccountStore) {
    let account = store.register("alice01", "hunter22").await.unwrap();
    assert_eq!(account.id, "alice01");
    assert_eq!(account.nickname, "alice01");
    assert!(account.comment.is_empty());

    let fetched = store.fetch("alice01").await.unwrap();
    assert_eq!(fetched, account);

    assert!(matches!(
        store.fetch("nobody01").await,
        Err(StoreError::NotFound)
    ));
}

pub async fn duplicate_register_rejected(store: &dyn AccountStore) {
    store.register("alice01", "hunter22").await.unwrap();
    let second = store.register("alice01", "different1").await;
    assert!(matches!(second, Err(StoreError::AlreadyExists)));

    // The first credential survives the rejected attempt
    store.authenticate("alice01", "hunter22").await.unwrap();
    assert!(matches!(
        store.authenticate("alice01", "different1").await,
        Err(StoreError::CredentialMismatch)
    ));
}

pub async fn concurrent_register_single_winner<S>(store: Arc<S>)
where
    S: AccountStore + 'static,
{
    let handles: Vec<_> = (0..CONTENDERS)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.register("racer01", &format!("password{i}")).await })
        })
        .collect();

    let mut winners = 0;
    let mut already_exists = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(StoreError::AlreadyExists) => already_exists += 1,
            Err(e) => panic!("unexpected register failure: {e}"),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(already_exists, CONTENDERS - 1);
}

pub async fn authenticate_outcomes(store: &dyn AccountStore) {
    store.register("alice01", "hunter22").await.unwrap();

    store.authenticate("alice01", "hunter22").await.unwrap();
    assert!(matches!(
        store.authenticate("alice01", "hunter23").await,
        Err(StoreError::CredentialMismatch)
    ));
    assert!(matches!(
        store.authenticate("nobody01", "hunter22").await,
        Err(StoreError::NotFound)
    ));
}

pub async fn patch_fields_partial_and_reset(store: &dyn AccountStore) {
    store.register("alice01", "hunter22").await.unwrap();

    let updated = store.patch_fields("alice01", &nickname("Al")).await.unwrap();
    assert_eq!(updated.nickname, "Al");
    assert!(updated.comment.is_empty());

    let updated = store
        .patch_fields("alice01", &comment("likes rust"))
        .await
        .unwrap();
    assert_eq!(updated.nickname, "Al");
    assert_eq!(updated.comment, "likes rust");

    let reset = store.patch_fields("alice01", &nickname("")).await.unwrap();
    assert_eq!(reset.nickname, "alice01");
    assert_eq!(reset.comment, "likes rust");

    assert_eq!(store.fetch("alice01").await.unwrap(), reset);
}

pub async fn patch_missing_account(store: &dyn AccountStore) {
    assert!(matches!(
        store.patch_fields("nobody01", &nickname("ghost")).await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        store.fetch("nobody01").await,
        Err(StoreError::NotFound)
    ));
}

/// Patches to different fields racing each other must both land; neither
/// may write back a stale copy of the other field.
pub async fn concurrent_single_field_patches<S>(store: Arc<S>)
where
    S: AccountStore + 'static,
{
    store.register("alice01", "hunter22").await.unwrap();

    let nickname_writer = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.patch_fields("alice01", &nickname("Al")).await })
    };
    let comment_writer = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.patch_fields("alice01", &comment("hi there")).await })
    };
    nickname_writer.await.unwrap().unwrap();
    comment_writer.await.unwrap().unwrap();

    let account = store.fetch("alice01").await.unwrap();
    assert_eq!(account.nickname, "Al");
    assert_eq!(account.comment, "hi there");
}

pub async fn patch_keeps_credential(store: &dyn AccountStore) {
    store.register("alice01", "hunter22").await.unwrap();
    store
        .patch_fields(
            "alice01",
            &ProfilePatch {
                nickname: Some("Al".to_string()),
                comment: Some("note".to_string()),
            },
        )
        .await
        .unwrap();

    store.authenticate("alice01", "hunter22").await.unwrap();
}

pub async fn remove_is_idempotent(store: &dyn AccountStore) {
    // Absent before the first call
    store.remove("ghost001").await.unwrap();
    store.remove("ghost001").await.unwrap();

    store.register("alice01", "hunter22").await.unwrap();
    store.remove("alice01").await.unwrap();
    store.remove("alice01").await.unwrap();

    assert!(matches!(
        store.fetch("alice01").await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        store.authenticate("alice01", "hunter22").await,
        Err(StoreError::NotFound)
    ));

    // Deletion is terminal: the id is free again
    store.register("alice01", "newpass1").await.unwrap();
}

/// Hashing at this cost outlasts [`ABANDON_AFTER`] by a wide margin.
pub const SLOW_COST: u32 = 10;

const ABANDON_AFTER: Duration = Duration::from_millis(5);

/// Long enough for abandoned bcrypt work at [`SLOW_COST`] to run out.
const SETTLE: Duration = Duration::from_millis(1500);

/// A register whose caller went away mid-flight leaves nothing behind, even
/// once its background work has finished. Needs a store hashing at
/// [`SLOW_COST`].
pub async fn cancelled_register_leaves_nothing<S>(store: Arc<S>)
where
    S: AccountStore + 'static,
{
    let abandoned =
        tokio::time::timeout(ABANDON_AFTER, store.register("quitter1", "hunter22")).await;
    assert!(abandoned.is_err(), "register finished before it could be abandoned");

    tokio::time::sleep(SETTLE).await;

    assert!(matches!(
        store.fetch("quitter1").await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        store.authenticate("quitter1", "hunter22").await,
        Err(StoreError::NotFound)
    ));

    // The id is still free
    store.register("quitter1", "hunter22").await.unwrap();
}
