#![allow(dead_code)]

use async_trait::async_trait;
use bathroom_finder::{
    AppConfig, AppState, IdentityState, MockIdentityProvider, RepositoryState, create_router,
    identity::Identity,
    models::{
        Bathroom, BathroomImage, CreateBathroomRequest, CreateImageRequest, CreateReviewRequest,
        Profile, Review, STATUS_APPROVED, STATUS_PENDING,
    },
    repository::Repository,
};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use uuid::Uuid;

// --- In-Memory Repository ---

// A stateful stand-in for PostgresRepository so the end-to-end suite runs
// without a database. Mirrors the SQL semantics the real queries carry:
// status filtering, ordering, upsert-on-conflict, and the absence of any
// cascade from bathrooms to reviews/images.
#[derive(Default)]
struct Store {
    bathrooms: Vec<Bathroom>,
    reviews: Vec<Review>,
    images: Vec<BathroomImage>,
    profiles: Vec<Profile>,
}

#[derive(Clone, Default)]
pub struct MemoryRepository {
    store: Arc<Mutex<Store>>,
    /// When true, every method reports a store failure.
    pub fail: Arc<Mutex<bool>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    fn check(&self) -> Result<(), sqlx::Error> {
        if *self.fail.lock().unwrap() {
            Err(sqlx::Error::PoolClosed)
        } else {
            Ok(())
        }
    }

    pub fn seed_profile(&self, id: Uuid, full_name: Option<&str>, is_admin: bool) {
        self.store.lock().unwrap().profiles.push(Profile {
            id,
            full_name: full_name.map(str::to_string),
            is_admin,
        });
    }

    /// Direct store reads for asserting on state the API does not expose
    /// (e.g. orphaned reviews after a listing deletion).
    pub fn stored_reviews_for(&self, bathroom_id: Uuid) -> usize {
        self.store
            .lock()
            .unwrap()
            .reviews
            .iter()
            .filter(|r| r.bathroom_id == bathroom_id)
            .count()
    }

    pub fn stored_images_for(&self, bathroom_id: Uuid) -> usize {
        self.store
            .lock()
            .unwrap()
            .images
            .iter()
            .filter(|i| i.bathroom_id == bathroom_id)
            .count()
    }

    pub fn profile(&self, id: Uuid) -> Option<Profile> {
        self.store
            .lock()
            .unwrap()
            .profiles
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_approved_bathrooms(&self) -> Result<Vec<Bathroom>, sqlx::Error> {
        self.check()?;
        let mut rows: Vec<Bathroom> = self
            .store
            .lock()
            .unwrap()
            .bathrooms
            .iter()
            .filter(|b| b.status == STATUS_APPROVED)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn list_all_bathrooms(&self) -> Result<Vec<Bathroom>, sqlx::Error> {
        self.check()?;
        let mut rows = self.store.lock().unwrap().bathrooms.clone();
        // pending first, newest first within status
        rows.sort_by(|a, b| {
            b.status
                .cmp(&a.status)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(rows)
    }

    async fn get_bathroom(&self, id: Uuid) -> Result<Option<Bathroom>, sqlx::Error> {
        self.check()?;
        Ok(self
            .store
            .lock()
            .unwrap()
            .bathrooms
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn create_bathroom(
        &self,
        req: CreateBathroomRequest,
        created_by: Uuid,
    ) -> Result<Bathroom, sqlx::Error> {
        self.check()?;
        let bathroom = Bathroom {
            id: Uuid::new_v4(),
            name: req.name,
            building: req.building,
            address: req.address,
            floor: req.floor,
            directions: req.directions,
            status: STATUS_PENDING.to_string(),
            created_by,
            created_at: Utc::now(),
        };
        self.store
            .lock()
            .unwrap()
            .bathrooms
            .push(bathroom.clone());
        Ok(bathroom)
    }

    async fn approve_bathroom(&self, id: Uuid) -> Result<Option<Bathroom>, sqlx::Error> {
        self.check()?;
        let mut store = self.store.lock().unwrap();
        Ok(store.bathrooms.iter_mut().find(|b| b.id == id).map(|b| {
            b.status = STATUS_APPROVED.to_string();
            b.clone()
        }))
    }

    async fn delete_bathroom(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        self.check()?;
        let mut store = self.store.lock().unwrap();
        let before = store.bathrooms.len();
        // No cascade: reviews and images stay behind, as in the real schema.
        store.bathrooms.retain(|b| b.id != id);
        Ok(store.bathrooms.len() < before)
    }

    async fn get_reviews(&self, bathroom_id: Uuid) -> Result<Vec<Review>, sqlx::Error> {
        self.check()?;
        let mut rows: Vec<Review> = self
            .store
            .lock()
            .unwrap()
            .reviews
            .iter()
            .filter(|r| r.bathroom_id == bathroom_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn create_review(
        &self,
        bathroom_id: Uuid,
        user_id: Uuid,
        req: CreateReviewRequest,
    ) -> Result<Review, sqlx::Error> {
        self.check()?;
        let review = Review {
            id: Uuid::new_v4(),
            bathroom_id,
            user_id,
            rating: req.rating,
            comment: req.comment,
            created_at: Utc::now(),
        };
        self.store.lock().unwrap().reviews.push(review.clone());
        Ok(review)
    }

    async fn get_images(&self, bathroom_id: Uuid) -> Result<Vec<BathroomImage>, sqlx::Error> {
        self.check()?;
        let mut rows: Vec<BathroomImage> = self
            .store
            .lock()
            .unwrap()
            .images
            .iter()
            .filter(|i| i.bathroom_id == bathroom_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn create_image(
        &self,
        bathroom_id: Uuid,
        uploaded_by: Uuid,
        req: CreateImageRequest,
    ) -> Result<BathroomImage, sqlx::Error> {
        self.check()?;
        let image = BathroomImage {
            id: Uuid::new_v4(),
            bathroom_id,
            url: req.url,
            caption: req.caption,
            uploaded_by,
            created_at: Utc::now(),
        };
        self.store.lock().unwrap().images.push(image.clone());
        Ok(image)
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, sqlx::Error> {
        self.check()?;
        Ok(self.profile(id))
    }

    async fn upsert_profile(
        &self,
        id: Uuid,
        full_name: Option<String>,
    ) -> Result<Profile, sqlx::Error> {
        self.check()?;
        let mut store = self.store.lock().unwrap();
        if let Some(existing) = store.profiles.iter_mut().find(|p| p.id == id) {
            // ON CONFLICT: keep is_admin, fill a missing display name only.
            if existing.full_name.is_none() {
                existing.full_name = full_name;
            }
            return Ok(existing.clone());
        }
        let profile = Profile {
            id,
            full_name,
            is_admin: false,
        };
        store.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, sqlx::Error> {
        self.check()?;
        Ok(self.store.lock().unwrap().profiles.clone())
    }

    async fn set_admin(&self, id: Uuid, is_admin: bool) -> Result<Option<Profile>, sqlx::Error> {
        self.check()?;
        let mut store = self.store.lock().unwrap();
        Ok(store.profiles.iter_mut().find(|p| p.id == id).map(|p| {
            p.is_admin = is_admin;
            p.clone()
        }))
    }
}

// --- Spawned Test Server ---

pub const USER_TOKEN: &str = "user-token";
pub const ADMIN_TOKEN: &str = "admin-token";

pub struct TestApp {
    pub address: String,
    pub repo: MemoryRepository,
    pub user_id: Uuid,
    pub admin_id: Uuid,
}

/// Boots the full router on an ephemeral port against the in-memory repository
/// and a mock identity provider pre-loaded with one regular user and one admin
/// (both profiles seeded, the admin's flag set).
pub async fn spawn_app() -> TestApp {
    let user_id = Uuid::new_v4();
    let admin_id = Uuid::new_v4();

    let repo = MemoryRepository::new();
    repo.seed_profile(user_id, Some("Regular User"), false);
    repo.seed_profile(admin_id, Some("The Admin"), true);

    let identity = MockIdentityProvider::new()
        .with_user(
            USER_TOKEN,
            Identity {
                id: user_id,
                email: "user@example.com".to_string(),
                full_name: Some("Regular User".to_string()),
            },
        )
        .with_user(
            ADMIN_TOKEN,
            Identity {
                id: admin_id,
                email: "admin@example.com".to_string(),
                full_name: Some("The Admin".to_string()),
            },
        );

    let state = AppState {
        repo: Arc::new(repo.clone()) as RepositoryState,
        identity: Arc::new(identity) as IdentityState,
        config: AppConfig::default(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        repo,
        user_id,
        admin_id,
    }
}
