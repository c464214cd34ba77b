use crate::{identity::Identity, models::Profile, repository::RepositoryState};

/// sync_profile
///
/// Ensures an authenticated identity has a matching `profiles` row, creating
/// one on first sight. The contract, in order:
///
/// - Found: return the stored row unchanged. No write happens, which is the
///   idempotence guarantee; repeated syncs of the same user are free.
/// - Not found (a normal outcome for a first-time user, not an error): insert
///   `{id, full_name from the identity metadata, is_admin = false}` and
///   return the created row. The insert is an upsert, so two first-sight
///   requests racing on the same id both succeed.
/// - Lookup or insert failure: log it and return `None`. Authentication has
///   already succeeded at this point, so the caller reports the profile as
///   unavailable (`profile: null`) instead of failing the whole request.
pub async fn sync_profile(repo: &RepositoryState, user: &Identity) -> Option<Profile> {
    match repo.get_profile(user.id).await {
        Ok(Some(profile)) => Some(profile),
        Ok(None) => match repo.upsert_profile(user.id, user.full_name.clone()).await {
            Ok(profile) => {
                tracing::info!(user_id = %user.id, "created profile on first sight");
                Some(profile)
            }
            Err(e) => {
                tracing::error!(user_id = %user.id, "profile creation failed: {:?}", e);
                None
            }
        },
        Err(e) => {
            tracing::error!(user_id = %user.id, "profile lookup failed: {:?}", e);
            None
        }
    }
}
