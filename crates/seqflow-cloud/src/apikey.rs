//! Seq API key resource
//!
//! Lifecycle of an API key against `/api/apikeys`:
//!
//! ```text
//! absent ──create──▶ created ──update──▶ created
//!    ▲                  │
//!    └──delete / 404 ───┘
//! ```
//!
//! Seq only returns the key's token in the create response. Every merge of a
//! server response into recorded state therefore keeps the last non-empty
//! token instead of clearing it.

use crate::error::{CloudError, Result};
use seqflow_client::SeqClient;
use seqflow_core::ApiKeyConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const API_KEYS_PATH: &str = "/api/apikeys";

/// Recorded state of a Seq API key
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyState {
    /// Server-assigned id; `None` until created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub title: String,

    /// Secret token, only ever returned by the create call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

impl std::fmt::Debug for ApiKeyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyState")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("owner_id", &self.owner_id)
            .field("permissions", &self.permissions)
            .finish()
    }
}

impl ApiKeyState {
    /// Initial state derived from desired configuration (no id, no token)
    pub fn from_config(desired: &ApiKeyConfig) -> Self {
        Self {
            id: None,
            title: desired.title.clone(),
            token: None,
            owner_id: desired.explicit_owner().map(str::to_string),
            permissions: desired.permissions.clone().unwrap_or_default(),
        }
    }

    /// Seed state for adopting an existing key; only the id is known
    pub fn imported(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// The recorded id, if it is non-empty
    pub fn recorded_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Copy every non-empty field of `response` into this state
    ///
    /// Absent or empty response fields leave the recorded value untouched,
    /// which is what keeps the token alive across reads and updates.
    pub fn merge_response(&mut self, response: &ApiKeyResponse) {
        if let Some(id) = non_empty(&response.id) {
            self.id = Some(id.to_string());
        }
        if let Some(title) = non_empty(&response.title) {
            self.title = title.to_string();
        }
        if let Some(token) = non_empty(&response.token) {
            self.token = Some(token.to_string());
        }
        if let Some(owner_id) = non_empty(&response.owner_id) {
            self.owner_id = Some(owner_id.to_string());
        }
        if let Some(permissions) = response.permissions.as_ref().filter(|p| !p.is_empty()) {
            self.permissions = permissions.iter().cloned().collect();
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Body of `POST /api/apikeys` and `PUT /api/apikeys/{id}`
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiKeyRequest<'a> {
    pub title: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<&'a BTreeSet<String>>,
}

impl<'a> From<&'a ApiKeyConfig> for ApiKeyRequest<'a> {
    fn from(desired: &'a ApiKeyConfig) -> Self {
        Self {
            title: &desired.title,
            owner_id: desired.explicit_owner(),
            permissions: desired.permissions.as_ref(),
        }
    }
}

/// API key document returned by Seq
///
/// Every field is optional; Seq sends many more fields, which are ignored.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiKeyResponse {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub owner_id: Option<String>,

    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

impl std::fmt::Debug for ApiKeyResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyResponse")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("owner_id", &self.owner_id)
            .field("permissions", &self.permissions)
            .finish()
    }
}

/// Manages Seq API keys
#[derive(Debug, Clone)]
pub struct ApiKeyResource {
    client: SeqClient,
}

impl ApiKeyResource {
    /// Resource type name used in plans and state
    pub const TYPE_NAME: &'static str = "seq_api_key";

    pub fn new(client: SeqClient) -> Self {
        Self { client }
    }

    /// Create a key; the first response is authoritative, token included
    pub async fn create(&self, desired: &ApiKeyConfig) -> Result<ApiKeyState> {
        let body = ApiKeyRequest::from(desired);

        let created: Option<ApiKeyResponse> = self
            .client
            .post(API_KEYS_PATH, &body)
            .await
            .map_err(CloudError::CreateFailed)?;

        let mut state = ApiKeyState::from_config(desired);
        if let Some(created) = &created {
            state.merge_response(created);
        }

        let Some(id) = state.recorded_id() else {
            return Err(CloudError::EmptyResponse);
        };
        tracing::info!("Created Seq API key '{}' ({})", state.title, id);
        if !state.has_token() {
            tracing::warn!("Seq did not return a token for API key {}", id);
        }

        Ok(state)
    }

    /// Refresh recorded state from the server
    ///
    /// Returns `Ok(None)` when the key no longer exists: either no id was
    /// ever recorded (no request is made) or the server answers 404.
    pub async fn read(&self, prior: &ApiKeyState) -> Result<Option<ApiKeyState>> {
        let Some(id) = prior.recorded_id() else {
            tracing::debug!("API key has no recorded id, treating as absent");
            return Ok(None);
        };
        let path = api_key_path(id)?;

        match self.client.get::<ApiKeyResponse>(&path).await {
            Ok(got) => {
                let mut state = prior.clone();
                if let Some(got) = &got {
                    state.merge_response(got);
                }
                Ok(Some(state))
            }
            Err(e) if e.is_not_found() => {
                tracing::info!("Seq API key {} no longer exists, dropping it from state", id);
                Ok(None)
            }
            Err(e) => Err(CloudError::ReadFailed(e)),
        }
    }

    /// Update a key in place; the id never changes
    pub async fn update(&self, desired: &ApiKeyConfig, prior: &ApiKeyState) -> Result<ApiKeyState> {
        let id = prior.recorded_id().ok_or(CloudError::MissingId)?;
        let path = api_key_path(id)?;
        let body = ApiKeyRequest::from(desired);

        let updated: Option<ApiKeyResponse> = self
            .client
            .put(&path, &body)
            .await
            .map_err(CloudError::UpdateFailed)?;

        let mut state = ApiKeyState::from_config(desired);
        state.id = prior.id.clone();
        state.token = prior.token.clone();
        if state.owner_id.is_none() {
            state.owner_id = prior.owner_id.clone();
        }
        if desired.permissions.is_none() {
            state.permissions = prior.permissions.clone();
        }
        if let Some(updated) = &updated {
            state.merge_response(updated);
        }

        tracing::info!("Updated Seq API key '{}' ({})", state.title, id);
        Ok(state)
    }

    /// Delete a key; missing ids and 404s both count as success
    pub async fn delete(&self, prior: &ApiKeyState) -> Result<()> {
        let Some(id) = prior.recorded_id() else {
            tracing::debug!("API key has no recorded id, nothing to delete");
            return Ok(());
        };
        let path = api_key_path(id)?;

        match self.client.delete(&path).await {
            Ok(()) => {
                tracing::info!("Deleted Seq API key {}", id);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!("Seq API key {} already deleted", id);
                Ok(())
            }
            Err(e) => Err(CloudError::DeleteFailed(e)),
        }
    }

    /// Adopt an existing key by id and populate state from the server
    pub async fn import(&self, id: &str) -> Result<Option<ApiKeyState>> {
        self.read(&ApiKeyState::imported(id)).await
    }
}

/// `/api/apikeys/{id}`, refusing ids that would escape the collection path
///
/// `%` is refused too: an escape such as `%2F` would reach the server as an
/// encoded slash.
fn api_key_path(id: &str) -> Result<String> {
    if id == "." || id == ".." || id.contains(['/', '\\', '?', '#', '%']) {
        return Err(CloudError::InvalidId(id.to_string()));
    }
    Ok(format!("{}/{}", API_KEYS_PATH, id))
}
