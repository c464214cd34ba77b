use crate::{
    AppState,
    auth::{AdminUser, AuthUser, bearer_token},
    error::{ApiError, AppJson},
    identity::IdentityError,
    models::{
        ApproveResponse, BathroomDetailResponse, BathroomResponse, BathroomsResponse,
        CreateBathroomRequest, CreateImageRequest, CreateReviewRequest, ImageResponse,
        ImagesResponse, LoginRequest, MeResponse, RatingSummary, RegisterResponse,
        RegisterUserRequest, ReviewResponse, ReviewsResponse, STATUS_APPROVED, SessionResponse,
        UpdateAdminRequest, UserResponse, UsersResponse,
    },
    profile::sync_profile,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use uuid::Uuid;

// --- Identity Endpoints ---

/// register_user
///
/// [Public Route] Creates a new account at the external identity provider.
///
/// *Note*: No profile row is created here. Profiles are lazy; the synchronizer
/// creates one the first time the new user calls `GET /me`.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Registered", body = RegisterResponse),
        (status = 400, description = "Invalid input or provider rejection")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterUserRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    payload.validate()?;

    let user = state
        .identity
        .sign_up(&payload.email, &payload.password, payload.full_name.as_deref())
        .await
        .map_err(|e| match e {
            // The provider refused the signup (duplicate email, weak password);
            // its message goes back to the client as a 400.
            IdentityError::Rejected(msg) => ApiError::Validation(msg),
            IdentityError::Unavailable(msg) => ApiError::Backend(msg),
        })?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user })))
}

/// login_user
///
/// [Public Route] Exchanges email + password for a session via the provider's
/// password grant. The token pair is passed through to the client verbatim;
/// the service keeps nothing.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = SessionResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    payload.validate()?;

    let session = state
        .identity
        .sign_in(&payload.email, &payload.password)
        .await
        .map_err(|e| match e {
            IdentityError::Rejected(_) => ApiError::Unauthorized,
            IdentityError::Unavailable(msg) => ApiError::Backend(msg),
        })?;

    Ok(Json(SessionResponse { session }))
}

/// logout_user
///
/// [Authenticated Route] Revokes the presented access token at the provider.
/// The handler re-reads the Authorization header itself: the `AuthUser`
/// extractor resolves the token but does not carry the raw string.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Token revoked"))
)]
pub async fn logout_user(
    _user: AuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = bearer_token(&headers)?;
    state.identity.sign_out(token).await.map_err(|e| match e {
        IdentityError::Rejected(_) => ApiError::Unauthorized,
        IdentityError::Unavailable(msg) => ApiError::Backend(msg),
    })?;
    Ok(StatusCode::NO_CONTENT)
}

/// get_me
///
/// [Authenticated Route] Returns the resolved identity together with its
/// application profile, running the profile synchronizer on the way. This is
/// where first-time users acquire their profile row.
///
/// A store failure during sync is *not* an error here: the response carries
/// `profile: null` and the client degrades.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Identity and profile", body = MeResponse))
)]
pub async fn get_me(user: AuthUser, State(state): State<AppState>) -> Json<MeResponse> {
    let identity = user.identity();
    let profile = sync_profile(&state.repo, &identity).await;
    Json(MeResponse {
        user: identity,
        profile,
    })
}

// --- Moderation Workflow: Listings ---

/// get_bathrooms
///
/// [Public Route] The directory listing: approved bathrooms only, newest
/// first. Pending submissions are filtered out at the repository level so
/// they can never leak to anonymous clients.
#[utoipa::path(
    get,
    path = "/bathrooms",
    responses((status = 200, description = "Approved listings", body = BathroomsResponse))
)]
pub async fn get_bathrooms(
    State(state): State<AppState>,
) -> Result<Json<BathroomsResponse>, ApiError> {
    let bathrooms = state.repo.list_approved_bathrooms().await?;
    Ok(Json(BathroomsResponse { bathrooms }))
}

/// create_bathroom
///
/// [Authenticated Route] Submits a new listing. The creator id is taken from
/// the resolved identity, never from the body, and the status is always
/// `pending`: visibility requires an admin's approval.
#[utoipa::path(
    post,
    path = "/bathrooms",
    request_body = CreateBathroomRequest,
    responses(
        (status = 201, description = "Submitted (pending approval)", body = BathroomResponse),
        (status = 400, description = "Missing required fields")
    )
)]
pub async fn create_bathroom(
    user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateBathroomRequest>,
) -> Result<(StatusCode, Json<BathroomResponse>), ApiError> {
    payload.validate()?;
    let bathroom = state.repo.create_bathroom(payload, user.id).await?;
    Ok((StatusCode::CREATED, Json(BathroomResponse { bathroom })))
}

/// get_bathroom_details
///
/// [Public Route] The single-listing view, returned regardless of moderation
/// status (a direct link to a pending listing works). Composes the listing
/// with its image records and the rating aggregate, which is recomputed from
/// the stored reviews on every read.
#[utoipa::path(
    get,
    path = "/bathrooms/{id}",
    params(("id" = Uuid, Path, description = "Bathroom ID")),
    responses(
        (status = 200, description = "Listing detail", body = BathroomDetailResponse),
        (status = 404, description = "No such listing")
    )
)]
pub async fn get_bathroom_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BathroomDetailResponse>, ApiError> {
    let bathroom = state
        .repo
        .get_bathroom(id)
        .await?
        .ok_or(ApiError::NotFound("Bathroom"))?;

    let images = state.repo.get_images(id).await?;
    let reviews = state.repo.get_reviews(id).await?;
    let summary = RatingSummary::from_reviews(&reviews);

    Ok(Json(BathroomDetailResponse {
        bathroom,
        images,
        review_count: summary.review_count,
        average_rating: summary.average_rating,
    }))
}

/// approve_bathroom
///
/// [Admin Route] Transitions a listing from `pending` to `approved`.
///
/// *Idempotency*: approving an already-approved listing is a no-op that still
/// answers 200, distinguished only by the message. The existence check runs
/// first, so an unknown id is always a 404 — but a concurrent delete between
/// the read and the update can still turn the update into a 404 (last write
/// wins; there is no transaction around the pair).
#[utoipa::path(
    patch,
    path = "/bathrooms/{id}/approve",
    params(("id" = Uuid, Path, description = "Bathroom ID")),
    responses(
        (status = 200, description = "Approved (or already approved)", body = ApproveResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such listing")
    )
)]
pub async fn approve_bathroom(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApproveResponse>, ApiError> {
    let bathroom = state
        .repo
        .get_bathroom(id)
        .await?
        .ok_or(ApiError::NotFound("Bathroom"))?;

    if bathroom.status == STATUS_APPROVED {
        return Ok(Json(ApproveResponse {
            message: "Bathroom already approved".to_string(),
            bathroom,
        }));
    }

    let bathroom = state
        .repo
        .approve_bathroom(id)
        .await?
        .ok_or(ApiError::NotFound("Bathroom"))?;

    Ok(Json(ApproveResponse {
        message: "Bathroom approved successfully".to_string(),
        bathroom,
    }))
}

/// delete_bathroom
///
/// [Admin Route] Removes a listing outright; there is no recorded "deleted"
/// state, the row simply ceases to exist. Its reviews and images stay behind
/// as orphans (source behavior, preserved deliberately).
#[utoipa::path(
    delete,
    path = "/bathrooms/{id}",
    params(("id" = Uuid, Path, description = "Bathroom ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such listing")
    )
)]
pub async fn delete_bathroom(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.repo.delete_bathroom(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Bathroom"))
    }
}

// --- Reviews ---

/// get_reviews
///
/// [Public Route] Lists a listing's reviews, newest first. The parent listing
/// must exist; orphaned reviews of a deleted listing are unreachable here.
#[utoipa::path(
    get,
    path = "/bathrooms/{id}/reviews",
    params(("id" = Uuid, Path, description = "Bathroom ID")),
    responses(
        (status = 200, description = "Reviews", body = ReviewsResponse),
        (status = 404, description = "No such listing")
    )
)]
pub async fn get_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReviewsResponse>, ApiError> {
    state
        .repo
        .get_bathroom(id)
        .await?
        .ok_or(ApiError::NotFound("Bathroom"))?;

    let reviews = state.repo.get_reviews(id).await?;
    Ok(Json(ReviewsResponse { reviews }))
}

/// create_review
///
/// [Authenticated Route] Appends a rating (1-5) with an optional comment.
/// Validation runs before any store access; the existence check runs before
/// the insert. No uniqueness rule: a user may review a listing repeatedly.
#[utoipa::path(
    post,
    path = "/bathrooms/{id}/reviews",
    params(("id" = Uuid, Path, description = "Bathroom ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review recorded", body = ReviewResponse),
        (status = 400, description = "Rating out of range or malformed body"),
        (status = 404, description = "No such listing")
    )
)]
pub async fn create_review(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    payload.validate()?;

    state
        .repo
        .get_bathroom(id)
        .await?
        .ok_or(ApiError::NotFound("Bathroom"))?;

    let review = state.repo.create_review(id, user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(ReviewResponse { review })))
}

// --- Images ---

/// get_images
///
/// [Public Route] Lists a listing's image records, newest first.
#[utoipa::path(
    get,
    path = "/bathrooms/{id}/images",
    params(("id" = Uuid, Path, description = "Bathroom ID")),
    responses(
        (status = 200, description = "Images", body = ImagesResponse),
        (status = 404, description = "No such listing")
    )
)]
pub async fn get_images(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ImagesResponse>, ApiError> {
    state
        .repo
        .get_bathroom(id)
        .await?
        .ok_or(ApiError::NotFound("Bathroom"))?;

    let images = state.repo.get_images(id).await?;
    Ok(Json(ImagesResponse { images }))
}

/// create_image
///
/// [Authenticated Route] Appends an image record (a client-supplied URL with
/// an optional caption) to a listing. The service stores the URL as given;
/// there is no upload pipeline behind it.
#[utoipa::path(
    post,
    path = "/bathrooms/{id}/images",
    params(("id" = Uuid, Path, description = "Bathroom ID")),
    request_body = CreateImageRequest,
    responses(
        (status = 201, description = "Image recorded", body = ImageResponse),
        (status = 400, description = "Missing URL"),
        (status = 404, description = "No such listing")
    )
)]
pub async fn create_image(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<CreateImageRequest>,
) -> Result<(StatusCode, Json<ImageResponse>), ApiError> {
    payload.validate()?;

    state
        .repo
        .get_bathroom(id)
        .await?
        .ok_or(ApiError::NotFound("Bathroom"))?;

    let image = state.repo.create_image(id, user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(ImageResponse { image })))
}

// --- Admin Views ---

/// get_admin_bathrooms
///
/// [Admin Route] The review queue: every listing regardless of status,
/// pending submissions first, newest first within each status.
#[utoipa::path(
    get,
    path = "/admin/bathrooms",
    responses(
        (status = 200, description = "All listings", body = BathroomsResponse),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn get_admin_bathrooms(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<BathroomsResponse>, ApiError> {
    let bathrooms = state.repo.list_all_bathrooms().await?;
    Ok(Json(BathroomsResponse { bathrooms }))
}

/// get_admin_users
///
/// [Admin Route] Lists every profile, for the user-management table.
#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "All profiles", body = UsersResponse),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn get_admin_users(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<UsersResponse>, ApiError> {
    let users = state.repo.list_profiles().await?;
    Ok(Json(UsersResponse { users }))
}

/// update_user_admin
///
/// [Admin Route] Grants or revokes another user's admin privilege. The change
/// takes effect on the target's next privileged request, since the guard
/// re-reads the profile every time (no cached privileges to go stale).
#[utoipa::path(
    patch,
    path = "/admin/users/{id}/admin",
    params(("id" = Uuid, Path, description = "Profile ID")),
    request_body = UpdateAdminRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such profile")
    )
)]
pub async fn update_user_admin(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateAdminRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .repo
        .set_admin(id, payload.is_admin)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(UserResponse { user }))
}
