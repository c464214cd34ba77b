use crate::models::{
    Bathroom, BathroomImage, CreateBathroomRequest, CreateImageRequest, CreateReviewRequest,
    Profile, Review, STATUS_APPROVED, STATUS_PENDING,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations. This is the core
/// of the Repository Abstraction pattern, allowing the handlers to interact with
/// the data layer without knowing the specific implementation (Postgres, Mock, etc.).
///
/// Every method returns `Result<_, sqlx::Error>`: the handlers need to tell a
/// normal "no rows" outcome (`Ok(None)`, `Ok(false)`) apart from a store failure
/// (`Err`), which always surfaces as a 500.
///
/// **Send + Sync + async_trait** are required to make the trait object (`Arc<dyn Repository>`)
/// safely shareable and usable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Listings ---
    // Public listing: approved rows only, newest first.
    async fn list_approved_bathrooms(&self) -> Result<Vec<Bathroom>, sqlx::Error>;
    // Admin review queue: every row regardless of status, pending first.
    async fn list_all_bathrooms(&self) -> Result<Vec<Bathroom>, sqlx::Error>;
    // Single listing by id, any status.
    async fn get_bathroom(&self, id: Uuid) -> Result<Option<Bathroom>, sqlx::Error>;
    // Inserts a new listing; status is always `pending` on creation.
    async fn create_bathroom(
        &self,
        req: CreateBathroomRequest,
        created_by: Uuid,
    ) -> Result<Bathroom, sqlx::Error>;
    // Flips a listing to `approved`. `Ok(None)` when the row no longer exists.
    async fn approve_bathroom(&self, id: Uuid) -> Result<Option<Bathroom>, sqlx::Error>;
    // Removes the listing row. Child reviews/images are left in place.
    async fn delete_bathroom(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    // --- Reviews (append-only) ---
    async fn get_reviews(&self, bathroom_id: Uuid) -> Result<Vec<Review>, sqlx::Error>;
    async fn create_review(
        &self,
        bathroom_id: Uuid,
        user_id: Uuid,
        req: CreateReviewRequest,
    ) -> Result<Review, sqlx::Error>;

    // --- Images (append-only) ---
    async fn get_images(&self, bathroom_id: Uuid) -> Result<Vec<BathroomImage>, sqlx::Error>;
    async fn create_image(
        &self,
        bathroom_id: Uuid,
        uploaded_by: Uuid,
        req: CreateImageRequest,
    ) -> Result<BathroomImage, sqlx::Error>;

    // --- Profiles ---
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, sqlx::Error>;
    // First-sight creation used by the profile synchronizer. Safe to race:
    // a concurrent insert of the same id resolves via ON CONFLICT.
    async fn upsert_profile(
        &self,
        id: Uuid,
        full_name: Option<String>,
    ) -> Result<Profile, sqlx::Error>;
    async fn list_profiles(&self) -> Result<Vec<Profile>, sqlx::Error>;
    // Admin privilege toggle. `Ok(None)` when no such profile exists.
    async fn set_admin(&self, id: Uuid, is_admin: bool) -> Result<Option<Profile>, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

const BATHROOM_COLUMNS: &str =
    "id, name, building, address, floor, directions, status, created_by, created_at";

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// list_approved_bathrooms
    ///
    /// The public directory view. **Security**: strictly enforces
    /// `WHERE status = 'approved'` so pending submissions never leak to
    /// anonymous clients.
    async fn list_approved_bathrooms(&self) -> Result<Vec<Bathroom>, sqlx::Error> {
        sqlx::query_as::<_, Bathroom>(&format!(
            "SELECT {BATHROOM_COLUMNS} FROM bathrooms WHERE status = $1 ORDER BY created_at DESC"
        ))
        .bind(STATUS_APPROVED)
        .fetch_all(&self.pool)
        .await
    }

    /// list_all_bathrooms
    ///
    /// Administrative listing with no status restriction. `'pending'` sorts
    /// after `'approved'`, so DESC on status puts the review queue first.
    async fn list_all_bathrooms(&self) -> Result<Vec<Bathroom>, sqlx::Error> {
        sqlx::query_as::<_, Bathroom>(&format!(
            "SELECT {BATHROOM_COLUMNS} FROM bathrooms ORDER BY status DESC, created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn get_bathroom(&self, id: Uuid) -> Result<Option<Bathroom>, sqlx::Error> {
        sqlx::query_as::<_, Bathroom>(&format!(
            "SELECT {BATHROOM_COLUMNS} FROM bathrooms WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// create_bathroom
    ///
    /// Inserts a new listing. The status column is hard-coded to `pending`
    /// here rather than taken from the request, so a submitter can never
    /// self-approve.
    async fn create_bathroom(
        &self,
        req: CreateBathroomRequest,
        created_by: Uuid,
    ) -> Result<Bathroom, sqlx::Error> {
        let new_id = Uuid::new_v4();
        sqlx::query_as::<_, Bathroom>(&format!(
            "INSERT INTO bathrooms (id, name, building, address, floor, directions, status, created_by, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW()) \
             RETURNING {BATHROOM_COLUMNS}"
        ))
        .bind(new_id)
        .bind(req.name)
        .bind(req.building)
        .bind(req.address)
        .bind(req.floor)
        .bind(req.directions)
        .bind(STATUS_PENDING)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
    }

    /// approve_bathroom
    ///
    /// Single-row status flip. Re-running it on an already-approved row is a
    /// harmless same-value write; the idempotent short-circuit lives in the
    /// handler, which re-reads the row first.
    async fn approve_bathroom(&self, id: Uuid) -> Result<Option<Bathroom>, sqlx::Error> {
        sqlx::query_as::<_, Bathroom>(&format!(
            "UPDATE bathrooms SET status = $1 WHERE id = $2 RETURNING {BATHROOM_COLUMNS}"
        ))
        .bind(STATUS_APPROVED)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// delete_bathroom
    ///
    /// Removes the listing row only. Reviews and images referencing it stay
    /// behind (no FK, no cascade); see the schema notes in migrations/.
    async fn delete_bathroom(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bathrooms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_reviews(&self, bathroom_id: Uuid) -> Result<Vec<Review>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            "SELECT id, bathroom_id, user_id, rating, comment, created_at \
             FROM reviews WHERE bathroom_id = $1 ORDER BY created_at DESC",
        )
        .bind(bathroom_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_review(
        &self,
        bathroom_id: Uuid,
        user_id: Uuid,
        req: CreateReviewRequest,
    ) -> Result<Review, sqlx::Error> {
        let new_id = Uuid::new_v4();
        sqlx::query_as::<_, Review>(
            "INSERT INTO reviews (id, bathroom_id, user_id, rating, comment, created_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) \
             RETURNING id, bathroom_id, user_id, rating, comment, created_at",
        )
        .bind(new_id)
        .bind(bathroom_id)
        .bind(user_id)
        .bind(req.rating)
        .bind(req.comment)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_images(&self, bathroom_id: Uuid) -> Result<Vec<BathroomImage>, sqlx::Error> {
        sqlx::query_as::<_, BathroomImage>(
            "SELECT id, bathroom_id, url, caption, uploaded_by, created_at \
             FROM bathroom_images WHERE bathroom_id = $1 ORDER BY created_at DESC",
        )
        .bind(bathroom_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_image(
        &self,
        bathroom_id: Uuid,
        uploaded_by: Uuid,
        req: CreateImageRequest,
    ) -> Result<BathroomImage, sqlx::Error> {
        let new_id = Uuid::new_v4();
        sqlx::query_as::<_, BathroomImage>(
            "INSERT INTO bathroom_images (id, bathroom_id, url, caption, uploaded_by, created_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) \
             RETURNING id, bathroom_id, url, caption, uploaded_by, created_at",
        )
        .bind(new_id)
        .bind(bathroom_id)
        .bind(req.url)
        .bind(req.caption)
        .bind(uploaded_by)
        .fetch_one(&self.pool)
        .await
    }

    /// get_profile
    ///
    /// Retrieves the profile record (display name, admin flag) backing both the
    /// admin authorization check and the profile synchronizer.
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, sqlx::Error> {
        sqlx::query_as::<_, Profile>("SELECT id, full_name, is_admin FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// upsert_profile
    ///
    /// First-sight profile creation. On conflict the existing row wins: the
    /// admin flag is never touched, and an already-set display name is kept
    /// (COALESCE only fills a NULL one).
    async fn upsert_profile(
        &self,
        id: Uuid,
        full_name: Option<String>,
    ) -> Result<Profile, sqlx::Error> {
        sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (id, full_name, is_admin) VALUES ($1, $2, FALSE) \
             ON CONFLICT (id) DO UPDATE SET full_name = COALESCE(profiles.full_name, EXCLUDED.full_name) \
             RETURNING id, full_name, is_admin",
        )
        .bind(id)
        .bind(full_name)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, sqlx::Error> {
        sqlx::query_as::<_, Profile>("SELECT id, full_name, is_admin FROM profiles ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    /// set_admin
    ///
    /// Grants or revokes the admin privilege. Takes effect on the target's
    /// next privileged request, since the guard re-reads the profile every time.
    async fn set_admin(&self, id: Uuid, is_admin: bool) -> Result<Option<Profile>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET is_admin = $1 WHERE id = $2 RETURNING id, full_name, is_admin",
        )
        .bind(is_admin)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
