mod common;

use bathroom_finder::{identity::Identity, profile::sync_profile, repository::RepositoryState};
use common::MemoryRepository;
use std::sync::Arc;
use uuid::Uuid;

fn identity(id: Uuid, name: Option<&str>) -> Identity {
    Identity {
        id,
        email: "sync@example.com".to_string(),
        full_name: name.map(str::to_string),
    }
}

#[tokio::test]
async fn test_first_sight_creates_profile_with_admin_false() {
    let memory = MemoryRepository::new();
    let repo: RepositoryState = Arc::new(memory.clone());
    let user = identity(Uuid::new_v4(), Some("First Timer"));

    let profile = sync_profile(&repo, &user)
        .await
        .expect("first sight creates the profile");

    assert_eq!(profile.id, user.id);
    assert_eq!(profile.full_name.as_deref(), Some("First Timer"));
    assert!(!profile.is_admin);
    assert!(memory.profile(user.id).is_some());
}

#[tokio::test]
async fn test_existing_profile_is_returned_unchanged() {
    // The idempotence guarantee: a second sync is a pure read. The stored
    // display name and admin flag win over whatever the identity now says.
    let memory = MemoryRepository::new();
    memory.seed_profile(Uuid::from_u128(7), Some("Stored Name"), true);
    let repo: RepositoryState = Arc::new(memory);
    let user = identity(Uuid::from_u128(7), Some("Different Name"));

    let profile = sync_profile(&repo, &user).await.expect("found");

    assert_eq!(profile.full_name.as_deref(), Some("Stored Name"));
    assert!(profile.is_admin);
}

#[tokio::test]
async fn test_repeated_sync_yields_same_profile() {
    let memory = MemoryRepository::new();
    let repo: RepositoryState = Arc::new(memory);
    let user = identity(Uuid::new_v4(), None);

    let first = sync_profile(&repo, &user).await.expect("created");
    let second = sync_profile(&repo, &user).await.expect("read back");

    assert_eq!(first.id, second.id);
    assert_eq!(first.full_name, second.full_name);
    assert_eq!(first.is_admin, second.is_admin);
}

#[tokio::test]
async fn test_lookup_failure_yields_none_not_panic() {
    // "Authentication succeeded, profile unavailable": a store outage turns
    // into a None result for the caller to degrade on, never an error.
    let memory = MemoryRepository::new();
    memory.set_failing(true);
    let repo: RepositoryState = Arc::new(memory);
    let user = identity(Uuid::new_v4(), Some("Unlucky"));

    assert!(sync_profile(&repo, &user).await.is_none());
}
