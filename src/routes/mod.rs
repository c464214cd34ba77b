/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules,
/// enforcing a Defense-in-Depth strategy. This structure ensures that
/// access control is applied explicitly at the module level (via Axum layers),
/// preventing accidental exposure of protected endpoints.
///
/// The three modules map directly to the defined access roles.

/// Routes accessible to all users (anonymous, read-only, plus the identity
/// entry points). Listing handlers must enforce the `status = 'approved'`
/// visibility rule at the Repository level.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Requires a token the identity provider resolves.
pub mod authenticated;

/// Routes restricted to profiles carrying the admin flag.
/// Every handler takes the `AdminUser` extractor.
pub mod admin;
