use bathroom_finder::{
    models::{CreateBathroomRequest, CreateImageRequest, CreateReviewRequest},
    repository::{PostgresRepository, Repository},
};
use sqlx::PgPool;
use tokio::test;
use uuid::Uuid;

// Live-database integration tests for PostgresRepository. They need a real
// Postgres reachable through DATABASE_URL, so the whole file is opt-in:
//
//   cargo test --test repository_integration_tests -- --ignored
//
// Migrations run on setup and every test works with freshly generated UUIDs,
// so the suite can share a database without cross-test interference.

// --- Test Context and Setup ---

struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

// --- Test Data Helpers ---

fn lobby_request(name: &str) -> CreateBathroomRequest {
    CreateBathroomRequest {
        name: name.to_string(),
        building: "Test Hall".to_string(),
        address: "1 Test St".to_string(),
        floor: Some("2".to_string()),
        directions: None,
    }
}

// --- Tests ---

#[test]
#[ignore]
async fn test_create_bathroom_starts_pending() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let creator = Uuid::new_v4();

    let bathroom = repo
        .create_bathroom(lobby_request("Pending Check"), creator)
        .await
        .expect("insert");

    assert_eq!(bathroom.status, "pending");
    assert_eq!(bathroom.created_by, creator);
    assert_eq!(bathroom.floor.as_deref(), Some("2"));
}

#[test]
#[ignore]
async fn test_public_listing_excludes_pending() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let creator = Uuid::new_v4();

    let pending = repo
        .create_bathroom(lobby_request("Hidden"), creator)
        .await
        .expect("insert");
    let approved = repo
        .create_bathroom(lobby_request("Visible"), creator)
        .await
        .expect("insert");
    repo.approve_bathroom(approved.id)
        .await
        .expect("approve")
        .expect("row exists");

    let listed = repo.list_approved_bathrooms().await.expect("list");
    assert!(listed.iter().any(|b| b.id == approved.id));
    assert!(listed.iter().all(|b| b.id != pending.id));

    // The admin queue sees both, pending first.
    let all = repo.list_all_bathrooms().await.expect("list all");
    let pending_pos = all.iter().position(|b| b.id == pending.id).unwrap();
    let approved_pos = all.iter().position(|b| b.id == approved.id).unwrap();
    assert!(pending_pos < approved_pos);
}

#[test]
#[ignore]
async fn test_approve_unknown_id_is_none() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let result = repo.approve_bathroom(Uuid::new_v4()).await.expect("query");
    assert!(result.is_none());
}

#[test]
#[ignore]
async fn test_delete_leaves_reviews_and_images_orphaned() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let creator = Uuid::new_v4();

    let bathroom = repo
        .create_bathroom(lobby_request("Doomed"), creator)
        .await
        .expect("insert");

    repo.create_review(
        bathroom.id,
        creator,
        CreateReviewRequest {
            rating: 5,
            comment: Some("won't last".to_string()),
        },
    )
    .await
    .expect("review insert");
    repo.create_image(
        bathroom.id,
        creator,
        CreateImageRequest {
            url: "https://img.example.com/doomed.jpg".to_string(),
            caption: None,
        },
    )
    .await
    .expect("image insert");

    assert!(repo.delete_bathroom(bathroom.id).await.expect("delete"));
    assert!(!repo.delete_bathroom(bathroom.id).await.expect("redelete"));
    assert!(repo.get_bathroom(bathroom.id).await.expect("get").is_none());

    // No cascade: the child rows survive the listing.
    assert_eq!(repo.get_reviews(bathroom.id).await.expect("reviews").len(), 1);
    assert_eq!(repo.get_images(bathroom.id).await.expect("images").len(), 1);
}

#[test]
#[ignore]
async fn test_reviews_come_back_newest_first() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let creator = Uuid::new_v4();

    let bathroom = repo
        .create_bathroom(lobby_request("Ordered"), creator)
        .await
        .expect("insert");

    for rating in [2, 4] {
        repo.create_review(
            bathroom.id,
            creator,
            CreateReviewRequest {
                rating,
                comment: None,
            },
        )
        .await
        .expect("review insert");
    }

    let reviews = repo.get_reviews(bathroom.id).await.expect("reviews");
    assert_eq!(reviews.len(), 2);
    assert!(reviews[0].created_at >= reviews[1].created_at);
}

#[test]
#[ignore]
async fn test_upsert_profile_preserves_admin_and_name() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let id = Uuid::new_v4();

    let created = repo
        .upsert_profile(id, Some("Original".to_string()))
        .await
        .expect("first upsert");
    assert!(!created.is_admin);

    let promoted = repo
        .set_admin(id, true)
        .await
        .expect("set_admin")
        .expect("profile exists");
    assert!(promoted.is_admin);

    // A racing second first-sight must not demote or rename.
    let resynced = repo
        .upsert_profile(id, Some("Impostor".to_string()))
        .await
        .expect("second upsert");
    assert!(resynced.is_admin);
    assert_eq!(resynced.full_name.as_deref(), Some("Original"));
}

#[test]
#[ignore]
async fn test_set_admin_unknown_profile_is_none() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let result = repo.set_admin(Uuid::new_v4(), true).await.expect("query");
    assert!(result.is_none());
}

#[test]
#[ignore]
async fn test_rating_check_constraint_rejects_out_of_range() {
    // Defense-in-depth below the handler validation: the schema itself
    // refuses out-of-range ratings.
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let creator = Uuid::new_v4();

    let bathroom = repo
        .create_bathroom(lobby_request("Constrained"), creator)
        .await
        .expect("insert");

    let result = repo
        .create_review(
            bathroom.id,
            creator,
            CreateReviewRequest {
                rating: 9,
                comment: None,
            },
        )
        .await;
    assert!(result.is_err(), "CHECK constraint should reject rating 9");
}
