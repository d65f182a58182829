use crate::utils;
use colored::Colorize;
use seqflow_cloud::HealthDataSource;
use seqflow_config::ProviderConfig;
use std::path::Path;

pub async fn handle(file: Option<&Path>, overrides: ProviderConfig) -> anyhow::Result<()> {
    // 設定ファイルがなくてもフラグと環境変数だけで実行できる
    let config = match file {
        Some(_) => utils::load_project(file)?.provider_config(overrides),
        None => match utils::load_project(None) {
            Ok(project) => project.provider_config(overrides),
            Err(e) => {
                tracing::debug!("No desired-state file: {}", e);
                overrides
            }
        },
    };

    let settings = config.resolve()?;
    println!("Seqサーバー: {}", settings.server_url.as_str().cyan());
    let client = seqflow_client::SeqClient::new(&settings)?;
    let health = HealthDataSource::new(client).read().await?;

    println!(
        "{} {}",
        "✓".green(),
        health.status.as_deref().unwrap_or("(ステータスなし)")
    );
    for (key, value) in &health.details {
        println!("  {}: {}", key.dimmed(), value);
    }
    Ok(())
}
