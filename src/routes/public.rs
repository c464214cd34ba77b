use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client
/// (anonymous or logged-in): the read-only directory views and the identity
/// entry points (register, login).
///
/// Security Mandate:
/// The directory listing handler must enforce `status = 'approved'` at the
/// Repository level. This prevents anonymous viewing of submissions still
/// pending moderation. The single-listing detail view is deliberately exempt
/// (a direct link to a pending listing works), matching the moderation design.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        // Returns "ok" immediately to verify the service is running and responsive.
        .route("/health", get(|| async { "ok" }))
        // POST /auth/register
        // Account creation at the external identity provider. No profile row
        // is created here; profiles are lazy (first GET /me).
        .route("/auth/register", post(handlers::register_user))
        // POST /auth/login
        // The password grant: exchanges credentials for a session token pair.
        .route("/auth/login", post(handlers::login_user))
        // GET /bathrooms
        // The public directory: approved listings only, newest first.
        .route("/bathrooms", get(handlers::get_bathrooms))
        // GET /bathrooms/{id}
        // Single-listing detail with images and the recomputed rating aggregate.
        .route("/bathrooms/{id}", get(handlers::get_bathroom_details))
        // GET /bathrooms/{id}/reviews
        // All reviews for a listing, newest first. 404 when the listing is gone.
        .route("/bathrooms/{id}/reviews", get(handlers::get_reviews))
        // GET /bathrooms/{id}/images
        // All image records for a listing, newest first.
        .route("/bathrooms/{id}/images", get(handlers::get_images))
}
