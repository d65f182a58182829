//! provider ノードのパース

use super::first_string;
use crate::error::{CoreError, Result};
use kdl::KdlNode;
use seqflow_config::ProviderConfig;

/// provider ノードをパース
pub fn parse_provider(node: &KdlNode) -> Result<ProviderConfig> {
    let mut provider = ProviderConfig::default();

    let Some(children) = node.children() else {
        return Ok(provider);
    };

    for child in children.nodes() {
        match child.name().value() {
            "server-url" | "server_url" => {
                provider.server_url = Some(required_string(child)?.to_string());
            }
            "api-key" | "api_key" => {
                provider.api_key = Some(required_string(child)?.to_string());
            }
            "insecure-skip-verify" | "insecure_skip_verify" => {
                let value = child
                    .entries()
                    .first()
                    .and_then(|e| e.value().as_bool())
                    .ok_or_else(|| {
                        CoreError::InvalidConfig(
                            "insecure-skip-verify requires #true or #false".to_string(),
                        )
                    })?;
                provider.insecure_skip_verify = Some(value);
            }
            "timeout-seconds" | "timeout_seconds" => {
                let value = child
                    .entries()
                    .first()
                    .and_then(|e| e.value().as_integer())
                    .and_then(|v| u64::try_from(v).ok())
                    .ok_or_else(|| {
                        CoreError::InvalidConfig(
                            "timeout-seconds requires a non-negative integer".to_string(),
                        )
                    })?;
                provider.timeout_seconds = Some(value);
            }
            other => {
                return Err(CoreError::InvalidConfig(format!(
                    "unknown provider setting: {}",
                    other
                )));
            }
        }
    }

    Ok(provider)
}

fn required_string(node: &KdlNode) -> Result<&str> {
    first_string(node).ok_or_else(|| {
        CoreError::InvalidConfig(format!("{} requires a string value", node.name().value()))
    })
}
