//! Plan execution against a Seq server
//!
//! The engine mutates [`GlobalState`] in memory; persisting it is left to
//! the caller (see [`crate::StateManager`]).

use crate::action::{ActionType, ApplyResult, Plan};
use crate::apikey::{ApiKeyResource, ApiKeyState};
use crate::error::{CloudError, Result};
use crate::state::GlobalState;
use seqflow_client::SeqClient;
use seqflow_core::ApiKeyConfig;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

/// Outcome of a refresh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Addresses whose state was re-read from the server
    pub refreshed: Vec<String>,

    /// Addresses dropped because the key no longer exists
    pub removed: Vec<String>,
}

pub struct Engine {
    api_keys: ApiKeyResource,
}

impl Engine {
    pub fn new(client: SeqClient) -> Self {
        Self {
            api_keys: ApiKeyResource::new(client),
        }
    }

    /// Re-read every recorded API key
    ///
    /// Stops at the first failing read; keys processed before it keep their
    /// refreshed state.
    pub async fn refresh(&self, state: &mut GlobalState) -> Result<RefreshReport> {
        let mut report = RefreshReport::default();
        let addresses: Vec<String> = state.api_keys.keys().cloned().collect();

        for address in addresses {
            let Some(prior) = state.api_key(&address).cloned() else {
                continue;
            };
            match self.api_keys.read(&prior).await? {
                Some(current) => {
                    if current != prior {
                        tracing::info!("API key {} drifted, state updated", address);
                    }
                    state.set_api_key(address.clone(), current);
                    report.refreshed.push(address);
                }
                None => {
                    state.remove_api_key(&address);
                    report.removed.push(address);
                }
            }
        }

        Ok(report)
    }

    /// Execute a plan sequentially
    ///
    /// State is only touched by actions that succeed. A failed action is
    /// recorded and the remaining actions still run.
    ///
    /// `cancel` is checked between actions: an action already sent to the
    /// server always runs to completion so its result (and any token) lands
    /// in `state` before the loop stops.
    pub async fn apply(
        &self,
        plan: &Plan,
        desired: &BTreeMap<String, ApiKeyConfig>,
        state: &mut GlobalState,
        cancel: &CancellationToken,
    ) -> ApplyResult {
        let mut result = ApplyResult::new();
        let start = std::time::Instant::now();

        for action in &plan.actions {
            if action.action_type != ActionType::NoOp && cancel.is_cancelled() {
                tracing::warn!("Apply interrupted before {}", action.address);
                result.interrupted = true;
                break;
            }

            let address = action.address.as_str();
            match action.action_type {
                ActionType::Create => {
                    let Some(config) = desired.get(address) else {
                        result.add_failure(address, format!("{} の設定が見つかりません", address));
                        continue;
                    };
                    tracing::info!("Creating API key: {}", address);

                    match self.api_keys.create(config).await {
                        Ok(created) => {
                            result.add_success(
                                address,
                                format!(
                                    "APIキー {} を作成しました (ID: {})",
                                    address,
                                    created.recorded_id().unwrap_or_default()
                                ),
                            );
                            state.set_api_key(address, created);
                        }
                        Err(e) => result.add_failure(address, e.to_string()),
                    }
                }
                ActionType::Update => {
                    let (Some(config), Some(prior)) = (desired.get(address), state.api_key(address))
                    else {
                        result.add_failure(address, format!("{} の設定が見つかりません", address));
                        continue;
                    };
                    tracing::info!("Updating API key: {}", address);

                    match self.api_keys.update(config, prior).await {
                        Ok(updated) => {
                            result.add_success(address, format!("APIキー {} を更新しました", address));
                            state.set_api_key(address, updated);
                        }
                        Err(e) => result.add_failure(address, e.to_string()),
                    }
                }
                ActionType::Delete => {
                    let Some(prior) = state.api_key(address) else {
                        result.add_success(address, format!("APIキー {} は既に存在しません", address));
                        continue;
                    };
                    tracing::info!("Deleting API key: {}", address);

                    match self.api_keys.delete(prior).await {
                        Ok(()) => {
                            result.add_success(address, format!("APIキー {} を削除しました", address));
                            state.remove_api_key(address);
                        }
                        Err(e) => result.add_failure(address, e.to_string()),
                    }
                }
                ActionType::NoOp => {}
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    /// Adopt an existing API key under `address`
    pub async fn import(
        &self,
        address: &str,
        id: &str,
        state: &mut GlobalState,
    ) -> Result<ApiKeyState> {
        if state.api_key(address).is_some() {
            return Err(CloudError::ResourceAlreadyExists(address.to_string()));
        }

        let imported = self
            .api_keys
            .import(id)
            .await?
            .ok_or_else(|| CloudError::ResourceNotFound(format!("API key {}", id)))?;

        tracing::info!("Imported API key {} as {}", id, address);
        state.set_api_key(address, imported.clone());
        Ok(imported)
    }

    /// Delete every recorded API key
    pub async fn destroy_all(
        &self,
        state: &mut GlobalState,
        cancel: &CancellationToken,
    ) -> ApplyResult {
        let plan = Plan::destroy(state);
        self.apply(&plan, &BTreeMap::new(), state, cancel).await
    }
}
