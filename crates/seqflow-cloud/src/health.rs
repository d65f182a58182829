//! Seq health data source

use crate::error::{CloudError, Result};
use seqflow_client::{HealthStatus, SeqClient};

/// Read-only view of `GET /health`
#[derive(Debug, Clone)]
pub struct HealthDataSource {
    client: SeqClient,
}

impl HealthDataSource {
    pub fn new(client: SeqClient) -> Self {
        Self { client }
    }

    pub async fn read(&self) -> Result<HealthStatus> {
        let status = self.client.health().await.map_err(CloudError::HealthFailed)?;
        tracing::debug!("Seq health: {:?}", status.status);
        Ok(status)
    }
}
