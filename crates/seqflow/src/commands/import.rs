use crate::utils;
use colored::Colorize;
use seqflow_cloud::Engine;
use seqflow_config::ProviderConfig;
use std::path::Path;

pub async fn handle(
    file: Option<&Path>,
    overrides: ProviderConfig,
    address: &str,
    id: &str,
) -> anyhow::Result<()> {
    let project = utils::load_project(file)?;
    utils::print_loaded_config_file(&project);

    let manager = project.state_manager();
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    let client = utils::connect(&project.provider_config(overrides)).await?;
    let imported = Engine::new(client).import(address, id, &mut state).await?;
    manager.save(&state).await?;
    lock.release().await?;

    println!(
        "{} APIキー {} を {} として取り込みました ({})",
        "✓".green(),
        id.cyan(),
        address.cyan(),
        imported.title
    );
    println!(
        "{}",
        "  注意: 取り込んだAPIキーのトークンはSeqから取得できません".yellow()
    );
    if project.flow.api_key(address).is_none() {
        println!(
            "{}",
            format!(
                "  警告: {} は設定ファイルに定義されていません（次回の apply で削除されます）",
                address
            )
            .yellow()
        );
    }
    Ok(())
}
