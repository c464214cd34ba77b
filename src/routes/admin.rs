use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch},
};

/// Admin Router Module
///
/// Defines the routes nested under `/admin`: the moderation review queue and
/// user management. (The approve/delete moderation actions live on the
/// top-level `/bathrooms` paths in the authenticated router.)
///
/// Access Control:
/// Every handler here takes the `AdminUser` extractor, which authenticates the
/// caller and then re-reads their profile, rejecting anyone without the admin
/// flag with 403. The profile read happens per request — revoking someone's
/// admin bit locks them out of these routes immediately.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/bathrooms
        // The review queue: every listing regardless of status, pending first.
        .route("/bathrooms", get(handlers::get_admin_bathrooms))
        // GET /admin/users
        // All profiles, for the user-management table.
        .route("/users", get(handlers::get_admin_users))
        // PATCH /admin/users/{id}/admin
        // Grants or revokes the admin privilege on a profile.
        .route("/users/{id}/admin", patch(handlers::update_user_admin))
}
