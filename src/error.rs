use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

/// ApiError
///
/// The application-wide failure taxonomy. Every handler returns
/// `Result<_, ApiError>`, and the `IntoResponse` implementation maps each
/// variant to its HTTP status with a uniform `{"error": <message>}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The caller presented no credential, or one the identity provider
    /// would not resolve.
    #[error("Unauthorized")]
    Unauthorized,
    /// The caller is authenticated but lacks the admin privilege.
    #[error("Forbidden: Admin access required")]
    Forbidden,
    /// The request body failed validation. Carries the message shown to the client.
    #[error("{0}")]
    Validation(String),
    /// The named resource does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The persistence layer failed mid-request.
    #[error("{0}")]
    Database(#[from] sqlx::Error),
    /// Any other downstream failure (identity provider outage, malformed
    /// upstream response).
    #[error("{0}")]
    Backend(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// ErrorResponse
///
/// The JSON body shape shared by every error status.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // 5xx bodies carry the underlying message; make sure it also lands in
        // the logs, correlated with the request span.
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// AppJson
///
/// Drop-in replacement for `axum::Json` as a request-body extractor. The stock
/// extractor answers 422 for type-level mismatches (a float where an integer
/// belongs); this wrapper reports every malformed body, whatever the cause, as
/// a 400 `Validation` error carrying axum's rejection message.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
        }
    }
}
