//! KDLパーサー
//!
//! seq.kdl をパースして [`Flow`] を生成します。
//! ノードタイプごとのパース処理はモジュールに分離されています。

mod api_key;
mod provider;


use api_key::parse_api_key;
use provider::parse_provider;

use crate::error::{CoreError, Result};
use crate::model::Flow;
use kdl::{KdlDocument, KdlNode};
use std::fs;
use std::path::Path;

/// KDLファイルをパースしてFlowを生成
pub fn parse_kdl_file<P: AsRef<Path>>(path: P) -> Result<Flow> {
    let content = fs::read_to_string(path.as_ref())?;
    let name = path
        .as_ref()
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();
    parse_kdl_string(&content, name)
}

/// KDL文字列をパース
pub fn parse_kdl_string(content: &str, default_name: String) -> Result<Flow> {
    let doc: KdlDocument = content.parse()?;

    let mut flow = Flow {
        name: default_name,
        ..Default::default()
    };
    let mut provider_seen = false;

    for node in doc.nodes() {
        match node.name().value() {
            "project" => {
                if let Some(project_name) = first_string(node) {
                    flow.name = project_name.to_string();
                }
            }
            "provider" => {
                if provider_seen {
                    return Err(CoreError::InvalidConfig(
                        "provider block may only appear once".to_string(),
                    ));
                }
                provider_seen = true;
                flow.provider = parse_provider(node)?;
            }
            "api-key" | "api_key" | "apikey" => {
                let (address, api_key) = parse_api_key(node)?;
                if flow.api_keys.contains_key(&address) {
                    return Err(CoreError::DuplicateApiKey(address));
                }
                flow.api_keys.insert(address, api_key);
            }
            other => {
                return Err(CoreError::InvalidConfig(format!(
                    "unknown top-level node: {}",
                    other
                )));
            }
        }
    }

    tracing::debug!(
        "Parsed flow '{}' with {} api keys",
        flow.name,
        flow.api_keys.len()
    );
    Ok(flow)
}

/// ノードの最初の引数を文字列として取得
fn first_string(node: &KdlNode) -> Option<&str> {
    node.entries().first().and_then(|e| e.value().as_string())
}
