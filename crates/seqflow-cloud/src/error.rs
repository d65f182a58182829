//! Resource reconciliation error types

use seqflow_client::ClientError;
use thiserror::Error;

/// Errors surfaced by resource lifecycle calls and state management
///
/// Display output always starts with a short title followed by the
/// underlying message (server status and body, or transport error text).
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Failed to create Seq API key: {0}")]
    CreateFailed(#[source] ClientError),

    #[error("Failed to read Seq API key: {0}")]
    ReadFailed(#[source] ClientError),

    #[error("Failed to update Seq API key: {0}")]
    UpdateFailed(#[source] ClientError),

    #[error("Failed to delete Seq API key: {0}")]
    DeleteFailed(#[source] ClientError),

    #[error("Failed to read Seq health: {0}")]
    HealthFailed(#[source] ClientError),

    #[error("Missing id: cannot update API key without an id in state")]
    MissingId,

    #[error("Failed to create Seq API key: server response did not include an id")]
    EmptyResponse,

    #[error("Invalid API key id: {0:?}")]
    InvalidId(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource already exists: {0}")]
    ResourceAlreadyExists(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Short headline suitable for a diagnostic summary
    pub fn title(&self) -> &'static str {
        match self {
            CloudError::CreateFailed(_) | CloudError::EmptyResponse => {
                "Failed to create Seq API key"
            }
            CloudError::ReadFailed(_) => "Failed to read Seq API key",
            CloudError::UpdateFailed(_) => "Failed to update Seq API key",
            CloudError::DeleteFailed(_) => "Failed to delete Seq API key",
            CloudError::HealthFailed(_) => "Failed to read Seq health",
            CloudError::MissingId => "Missing id",
            CloudError::InvalidId(_) => "Invalid API key id",
            CloudError::ResourceNotFound(_) => "Resource not found",
            CloudError::ResourceAlreadyExists(_) => "Resource already exists",
            CloudError::StateError(_) | CloudError::Io(_) | CloudError::Json(_) => {
                "State file error"
            }
            CloudError::LockError(_) => "Lock acquisition failed",
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
