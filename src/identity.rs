use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// Hard ceiling on every provider round-trip so a stalled provider cannot pin
// request handlers.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity
///
/// The provider's view of a user: the canonical id, the login email, and the
/// display name carried in the signup metadata. This is what the guard hands
/// to handlers and what the profile synchronizer mirrors locally.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
}

/// Session
///
/// The token pair issued by a successful password grant, plus the identity it
/// belongs to. Passed through to the client verbatim; the service itself
/// never stores tokens.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Identity,
}

/// IdentityError
///
/// The two failure modes of the identity provider that callers distinguish:
/// an explicit refusal (bad credentials, duplicate signup, revoked token)
/// versus not getting a usable answer at all.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider understood the request and refused it. Carries the
    /// provider's own message.
    #[error("{0}")]
    Rejected(String),
    /// The provider was unreachable, timed out, or answered malformed.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

// 1. IdentityProvider Contract

/// IdentityProvider
///
/// Abstract contract for the hosted identity service. The handlers and the
/// auth extractors depend only on this trait, so the concrete HTTP client
/// (SupabaseIdentityClient) can be swapped for the in-memory mock
/// (MockIdentityProvider) in tests.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates a new account. `full_name` rides along as signup metadata.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<Identity, IdentityError>;

    /// Exchanges email + password for a session (the password grant).
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError>;

    /// Revokes the given access token at the provider.
    async fn sign_out(&self, token: &str) -> Result<(), IdentityError>;

    /// Resolves an access token to the identity it belongs to. This is the
    /// per-request call behind the authorization guard.
    async fn get_user(&self, token: &str) -> Result<Identity, IdentityError>;
}

/// IdentityState
///
/// The concrete type used to share the identity provider across the application state.
pub type IdentityState = Arc<dyn IdentityProvider>;

// 2. The Real Implementation (Supabase GoTrue HTTP API)

/// SupabaseIdentityClient
///
/// Thin reqwest client for the Supabase auth endpoints (`/auth/v1/*`). Every
/// request carries the project's anon key in the `apikey` header; the
/// token-scoped calls additionally carry `Authorization: Bearer`.
#[derive(Clone)]
pub struct SupabaseIdentityClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseIdentityClient {
    /// Constructs the client from the configured project URL and anon key.
    /// Runs at startup, so client-construction failure is fatal.
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("FATAL: failed to construct the identity HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Wire format of a GoTrue user object. Collapsed into `Identity`; the
/// display name lives under `user_metadata.full_name`.
#[derive(Deserialize)]
struct ProviderUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: serde_json::Value,
}

impl From<ProviderUser> for Identity {
    fn from(user: ProviderUser) -> Self {
        let full_name = user
            .user_metadata
            .get("full_name")
            .and_then(|value| value.as_str())
            .map(str::to_string);
        Identity {
            id: user.id,
            email: user.email.unwrap_or_default(),
            full_name,
        }
    }
}

#[derive(Deserialize)]
struct ProviderSession {
    access_token: String,
    refresh_token: String,
    user: ProviderUser,
}

/// Maps a non-success provider response to an IdentityError, digging the
/// human-readable message out of the handful of error body shapes GoTrue
/// uses (`msg`, `message`, `error_description`, `error`).
async fn provider_error(response: reqwest::Response) -> IdentityError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| {
            ["msg", "message", "error_description", "error"]
                .iter()
                .find_map(|key| {
                    value
                        .get(key)
                        .and_then(|message| message.as_str())
                        .map(str::to_string)
                })
        })
        .unwrap_or_else(|| format!("identity provider returned {}", status));

    if status.is_client_error() {
        IdentityError::Rejected(message)
    } else {
        IdentityError::Unavailable(message)
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<Identity, IdentityError> {
        let mut payload = serde_json::json!({ "email": email, "password": password });
        if let Some(name) = full_name {
            payload["data"] = serde_json::json!({ "full_name": name });
        }

        let response = self
            .http
            .post(self.endpoint("/auth/v1/signup"))
            .header("apikey", &self.anon_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        // Depending on the project's confirmation settings the signup answer
        // is either the bare user object or a session wrapping one.
        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        let user_value = value
            .get("user")
            .filter(|candidate| candidate.is_object())
            .cloned()
            .unwrap_or(value);
        let user: ProviderUser = serde_json::from_value(user_value)
            .map_err(|e| IdentityError::Unavailable(format!("unexpected signup response: {}", e)))?;

        Ok(user.into())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let response = self
            .http
            .post(self.endpoint("/auth/v1/token?grant_type=password"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        let session: ProviderSession = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("unexpected token response: {}", e)))?;

        Ok(Session {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            user: session.user.into(),
        })
    }

    async fn sign_out(&self, token: &str) -> Result<(), IdentityError> {
        let response = self
            .http
            .post(self.endpoint("/auth/v1/logout"))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }
        Ok(())
    }

    async fn get_user(&self, token: &str) -> Result<Identity, IdentityError> {
        let response = self
            .http
            .get(self.endpoint("/auth/v1/user"))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        let user: ProviderUser = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("unexpected user response: {}", e)))?;
        Ok(user.into())
    }
}

// 3. The Mock Implementation (For Unit Tests)

/// MockIdentityProvider
///
/// In-memory stand-in for the hosted provider: a fixed token-to-identity map,
/// plus a switch that simulates a provider outage. Lets the auth extractors
/// and the auth endpoints be tested without any network access.
#[derive(Clone, Default)]
pub struct MockIdentityProvider {
    // token -> resolved identity
    pub users: HashMap<String, Identity>,
    /// When true, all operations return `IdentityError::Unavailable`.
    pub should_fail: bool,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            users: HashMap::new(),
            should_fail: true,
        }
    }

    /// Registers an identity resolvable through `token`.
    pub fn with_user(mut self, token: &str, identity: Identity) -> Self {
        self.users.insert(token.to_string(), identity);
        self
    }

    fn check_available(&self) -> Result<(), IdentityError> {
        if self.should_fail {
            return Err(IdentityError::Unavailable(
                "Mock identity error: simulation requested".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        full_name: Option<&str>,
    ) -> Result<Identity, IdentityError> {
        self.check_available()?;
        if self.users.values().any(|user| user.email == email) {
            return Err(IdentityError::Rejected(
                "User already registered".to_string(),
            ));
        }
        Ok(Identity {
            id: Uuid::new_v4(),
            email: email.to_string(),
            full_name: full_name.map(str::to_string),
        })
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<Session, IdentityError> {
        self.check_available()?;
        let (token, user) = self
            .users
            .iter()
            .find(|(_, user)| user.email == email)
            .map(|(token, user)| (token.clone(), user.clone()))
            .ok_or_else(|| IdentityError::Rejected("Invalid login credentials".to_string()))?;
        Ok(Session {
            access_token: token,
            refresh_token: "mock-refresh-token".to_string(),
            user,
        })
    }

    async fn sign_out(&self, token: &str) -> Result<(), IdentityError> {
        self.check_available()?;
        if self.users.contains_key(token) {
            Ok(())
        } else {
            Err(IdentityError::Rejected("invalid token".to_string()))
        }
    }

    async fn get_user(&self, token: &str) -> Result<Identity, IdentityError> {
        self.check_available()?;
        self.users
            .get(token)
            .cloned()
            .ok_or_else(|| IdentityError::Rejected("invalid token".to_string()))
    }
}
