//! api-key ノードのパース

use super::first_string;
use crate::error::{CoreError, Result};
use crate::model::ApiKeyConfig;
use kdl::KdlNode;
use std::collections::BTreeSet;

/// api-key ノードをパース
///
/// ```kdl
/// api-key "ingest" {
///     title "ingest"
///     owner-id "user-admin"
///     permissions "Ingest" "Read"
/// }
/// ```
pub fn parse_api_key(node: &KdlNode) -> Result<(String, ApiKeyConfig)> {
    let address = first_string(node)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| CoreError::InvalidConfig("api-key requires a name".to_string()))?
        .to_string();

    let mut title: Option<String> = None;
    let mut owner_id: Option<String> = None;
    let mut permissions: Option<BTreeSet<String>> = None;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "title" => {
                    title = first_string(child).map(|s| s.to_string());
                }
                "owner-id" | "owner_id" | "owner" => {
                    owner_id = first_string(child).map(|s| s.to_string());
                }
                "permissions" => {
                    // 複数の権限を引数として受け取る（空なら全権限を外す）
                    let mut set = BTreeSet::new();
                    for entry in child.entries() {
                        let value = entry.value().as_string().ok_or_else(|| {
                            CoreError::InvalidConfig(format!(
                                "api-key '{}': permissions must be strings",
                                address
                            ))
                        })?;
                        set.insert(value.to_string());
                    }
                    permissions = Some(set);
                }
                other => {
                    return Err(CoreError::InvalidConfig(format!(
                        "api-key '{}': unknown attribute {}",
                        address, other
                    )));
                }
            }
        }
    }

    let title = title.filter(|t| !t.is_empty()).ok_or_else(|| {
        CoreError::InvalidConfig(format!("api-key '{}' requires a non-empty title", address))
    })?;

    Ok((
        address,
        ApiKeyConfig {
            title,
            owner_id,
            permissions,
        },
    ))
}
