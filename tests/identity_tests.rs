use bathroom_finder::identity::{
    Identity, IdentityError, IdentityProvider, MockIdentityProvider,
};
use uuid::Uuid;

// Contract tests for the mock identity provider: the rest of the test suite
// leans on these semantics (token map, duplicate-signup rejection, outage
// switch), so they are pinned down here.

fn known_user(id: Uuid) -> Identity {
    Identity {
        id,
        email: "known@example.com".to_string(),
        full_name: None,
    }
}

#[tokio::test]
async fn test_sign_up_rejects_duplicate_email() {
    let provider =
        MockIdentityProvider::new().with_user("token", known_user(Uuid::new_v4()));

    let err = provider
        .sign_up("known@example.com", "pw", None)
        .await
        .expect_err("duplicate email");
    assert!(matches!(err, IdentityError::Rejected(_)));

    let fresh = provider
        .sign_up("fresh@example.com", "pw", Some("Fresh"))
        .await
        .expect("new email signs up");
    assert_eq!(fresh.email, "fresh@example.com");
    assert_eq!(fresh.full_name.as_deref(), Some("Fresh"));
}

#[tokio::test]
async fn test_sign_in_matches_by_email() {
    let id = Uuid::new_v4();
    let provider = MockIdentityProvider::new().with_user("the-token", known_user(id));

    let session = provider
        .sign_in("known@example.com", "pw")
        .await
        .expect("known email signs in");
    assert_eq!(session.access_token, "the-token");
    assert_eq!(session.user.id, id);

    let err = provider
        .sign_in("ghost@example.com", "pw")
        .await
        .expect_err("unknown email");
    assert!(matches!(err, IdentityError::Rejected(_)));
}

#[tokio::test]
async fn test_get_user_resolves_only_known_tokens() {
    let id = Uuid::new_v4();
    let provider = MockIdentityProvider::new().with_user("good", known_user(id));

    assert_eq!(provider.get_user("good").await.unwrap().id, id);
    assert!(matches!(
        provider.get_user("bad").await.unwrap_err(),
        IdentityError::Rejected(_)
    ));
}

#[tokio::test]
async fn test_sign_out_requires_known_token() {
    let provider =
        MockIdentityProvider::new().with_user("good", known_user(Uuid::new_v4()));
    assert!(provider.sign_out("good").await.is_ok());
    assert!(provider.sign_out("bad").await.is_err());
}

#[tokio::test]
async fn test_failing_provider_is_unavailable_everywhere() {
    let provider = MockIdentityProvider::new_failing();

    assert!(matches!(
        provider.get_user("any").await.unwrap_err(),
        IdentityError::Unavailable(_)
    ));
    assert!(matches!(
        provider.sign_in("a@b.com", "pw").await.unwrap_err(),
        IdentityError::Unavailable(_)
    ));
    assert!(matches!(
        provider.sign_up("a@b.com", "pw", None).await.unwrap_err(),
        IdentityError::Unavailable(_)
    ));
}
