//! Desired-state model

use seqflow_config::ProviderConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Everything declared in one `seq.kdl`
#[derive(Debug, Clone, Default)]
pub struct Flow {
    /// Project name (`project "..."`, or the directory name)
    pub name: String,

    /// `provider { ... }` block; unset values fall back to the environment
    pub provider: ProviderConfig,

    /// API keys indexed by address (the node's first argument)
    pub api_keys: BTreeMap<String, ApiKeyConfig>,
}

impl Flow {
    pub fn api_key(&self, address: &str) -> Option<&ApiKeyConfig> {
        self.api_keys.get(address)
    }
}

/// Desired configuration of one Seq API key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    /// Human-friendly title (required, non-empty)
    pub title: String,

    /// Owner principal id; `None` lets the server pick
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    /// Permissions delegated to the key (e.g. Read, Write, Ingest, Project, System)
    ///
    /// `None` means "not managed"; `Some` of an empty set revokes everything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<BTreeSet<String>>,
}

impl ApiKeyConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            owner_id: None,
            permissions: None,
        }
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = Some(permissions.into_iter().map(Into::into).collect());
        self
    }

    /// Owner id when set to a non-empty value
    pub fn explicit_owner(&self) -> Option<&str> {
        self.owner_id.as_deref().filter(|o| !o.is_empty())
    }
}
