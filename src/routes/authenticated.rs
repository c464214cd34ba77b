use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

/// Authenticated Router Module
///
/// Defines the routes accessible to any user who has successfully passed the
/// authentication layer: submitting listings, reviews, and images, plus the
/// session-scoped endpoints (profile, logout).
///
/// Access Control Strategy:
/// Every handler in this module relies on the `AuthUser` extractor middleware
/// being present on the router layer above this module, guaranteeing a token
/// the identity provider resolves. The two moderation routes registered here
/// (`approve`, `delete`) additionally take the `AdminUser` extractor inside
/// the handler, which re-reads the caller's profile and rejects non-admins
/// with 403. They live at the top-level `/bathrooms` paths (not under
/// `/admin`) because they act on the same resource the public routes expose.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /auth/logout
        // Revokes the presented access token at the identity provider.
        .route("/auth/logout", post(handlers::logout_user))
        // GET /me
        // Resolved identity plus the synchronized profile. First-time users
        // acquire their profile row here.
        .route("/me", get(handlers::get_me))
        // --- Listing Submission & Moderation ---
        // POST /bathrooms
        // Submits a new listing; it enters the moderation queue as `pending`.
        .route("/bathrooms", post(handlers::create_bathroom))
        // PATCH /bathrooms/{id}/approve  [admin]
        // Idempotent pending -> approved transition.
        .route("/bathrooms/{id}/approve", patch(handlers::approve_bathroom))
        // DELETE /bathrooms/{id}  [admin]
        // Removes the listing outright; reviews/images stay behind.
        .route("/bathrooms/{id}", delete(handlers::delete_bathroom))
        // --- Reviews & Images ---
        // POST /bathrooms/{id}/reviews
        // Appends a 1-5 rating with an optional comment. Validation precedes
        // the existence check; both precede the insert.
        .route("/bathrooms/{id}/reviews", post(handlers::create_review))
        // POST /bathrooms/{id}/images
        // Appends an image record (client-supplied URL, optional caption).
        .route("/bathrooms/{id}/images", post(handlers::create_image))
}
