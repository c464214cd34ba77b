use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::identity::{Identity, Session};

// --- Moderation Status ---

// Stored as text in `bathrooms.status`; the schema CHECK constraint admits
// exactly these two values.
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";

// --- Core Application Schemas (Mapped to Database) ---

/// Profile
///
/// The application-side mirror of an identity-provider user, stored in the
/// `profiles` table. Rows are created lazily by the profile synchronizer the
/// first time an authenticated user is seen, never at registration time.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Profile {
    // Primary key, equal to the identity provider's user id.
    pub id: Uuid,
    // Display name copied from the identity metadata on first sight; may be absent.
    pub full_name: Option<String>,
    // The single privilege flag. Admins approve/delete listings and manage admins.
    pub is_admin: bool,
}

/// Bathroom
///
/// A directory listing from the `bathrooms` table. Every listing starts life
/// as `pending` and becomes publicly visible only once an admin approves it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Bathroom {
    pub id: Uuid,
    pub name: String,
    pub building: String,
    pub address: String,
    pub floor: Option<String>,
    pub directions: Option<String>,
    // One of STATUS_PENDING / STATUS_APPROVED.
    pub status: String,
    // The submitting user's identity id. A soft reference: the matching
    // profile row may not exist yet.
    pub created_by: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// BathroomImage
///
/// A client-supplied image URL attached to a listing (`bathroom_images` table).
/// Rows survive the deletion of their listing.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct BathroomImage {
    pub id: Uuid,
    pub bathroom_id: Uuid,
    pub url: String,
    pub caption: Option<String>,
    pub uploaded_by: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Review
///
/// A 1-5 star rating with an optional comment (`reviews` table). Append-only;
/// a user may review the same listing any number of times.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Review {
    pub id: Uuid,
    pub bathroom_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// CreateBathroomRequest
///
/// Input payload for submitting a new listing (POST /bathrooms). Body-shape
/// failures (missing field, wrong type) are caught by the `AppJson` extractor;
/// `validate` covers the remaining field-level rules.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateBathroomRequest {
    pub name: String,
    pub building: String,
    pub address: String,
    pub floor: Option<String>,
    pub directions: Option<String>,
}

impl CreateBathroomRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty()
            || self.building.trim().is_empty()
            || self.address.trim().is_empty()
        {
            return Err(ApiError::Validation(
                "Missing required fields: name, building, and address are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// CreateReviewRequest
///
/// Input payload for posting a review. `rating` is a plain integer field, so a
/// float or string in the body never reaches `validate` (the body extractor
/// rejects it first); the range check here handles in-type violations like 0 or 6.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

impl CreateReviewRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !(1..=5).contains(&self.rating) {
            return Err(ApiError::Validation(
                "Rating is required and must be a number between 1 and 5".to_string(),
            ));
        }
        Ok(())
    }
}

/// CreateImageRequest
///
/// Input payload for attaching an image record to a listing. The service
/// stores the URL as given; there is no upload pipeline behind it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateImageRequest {
    pub url: String,
    pub caption: Option<String>,
}

impl CreateImageRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.url.trim().is_empty() {
            return Err(ApiError::Validation("URL is required".to_string()));
        }
        Ok(())
    }
}

/// RegisterUserRequest
///
/// Input payload for the public registration endpoint (POST /auth/register).
/// The password is only passed through to the external identity provider and
/// never persisted or logged by this application.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

impl RegisterUserRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::Validation(
                "Email and password are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// LoginRequest
///
/// Input payload for the password-grant login endpoint (POST /auth/login).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::Validation(
                "Email and password are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// UpdateAdminRequest
///
/// Input payload for the admin-privilege toggle (PATCH /admin/users/{id}/admin).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateAdminRequest {
    pub is_admin: bool,
}

// --- Read/Aggregate Layer ---

/// RatingSummary
///
/// Review statistics for one listing, recomputed from the stored reviews on
/// every read. `average_rating` is `None` (serialized as `null`) when the
/// listing has no reviews, never zero.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RatingSummary {
    #[serde(rename = "reviewCount")]
    pub review_count: i64,
    #[serde(rename = "averageRating")]
    pub average_rating: Option<f64>,
}

impl RatingSummary {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        if reviews.is_empty() {
            return Self {
                review_count: 0,
                average_rating: None,
            };
        }
        let total: i64 = reviews.iter().map(|review| i64::from(review.rating)).sum();
        Self {
            review_count: reviews.len() as i64,
            average_rating: Some(total as f64 / reviews.len() as f64),
        }
    }
}

// --- Response Envelopes (Output Schemas) ---

// The API wraps every payload in a named key ({"bathrooms": [...]}) rather
// than returning bare arrays/objects. The envelope structs below pin those
// key names for serde, the OpenAPI document, and the TypeScript bindings.

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BathroomsResponse {
    pub bathrooms: Vec<Bathroom>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BathroomResponse {
    pub bathroom: Bathroom,
}

/// BathroomDetailResponse
///
/// The single-listing view: the listing itself, its image records, and the
/// recomputed rating aggregate (camelCase keys as consumed by the frontend).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BathroomDetailResponse {
    pub bathroom: Bathroom,
    pub images: Vec<BathroomImage>,
    #[serde(rename = "reviewCount")]
    pub review_count: i64,
    #[serde(rename = "averageRating")]
    pub average_rating: Option<f64>,
}

/// ApproveResponse
///
/// Returned by the approve endpoint in both the fresh-approval and
/// already-approved cases; the `message` distinguishes them.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ApproveResponse {
    pub message: String,
    pub bathroom: Bathroom,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ReviewsResponse {
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ReviewResponse {
    pub review: Review,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ImagesResponse {
    pub images: Vec<BathroomImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ImageResponse {
    pub image: BathroomImage,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UsersResponse {
    pub users: Vec<Profile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserResponse {
    pub user: Profile,
}

/// RegisterResponse
///
/// Output of POST /auth/register: the identity as the provider created it.
/// No profile row exists yet at this point.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterResponse {
    pub user: Identity,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SessionResponse {
    pub session: Session,
}

/// MeResponse
///
/// Output of GET /me: the resolved identity plus the synchronized profile.
/// `profile` is `null` when the store made the profile unavailable, which is
/// not an error at this endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MeResponse {
    pub user: Identity,
    pub profile: Option<Profile>,
}
