use crate::utils;
use colored::Colorize;
use seqflow_cloud::Engine;
use seqflow_config::ProviderConfig;
use std::path::Path;

pub async fn handle(file: Option<&Path>, overrides: ProviderConfig) -> anyhow::Result<()> {
    let project = utils::load_project(file)?;
    utils::print_loaded_config_file(&project);

    let manager = project.state_manager();
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    if state.api_keys.is_empty() {
        println!("{}", "管理下のAPIキーはありません".dimmed());
        lock.release().await?;
        return Ok(());
    }

    let client = utils::connect(&project.provider_config(overrides)).await?;
    let report = Engine::new(client).refresh(&mut state).await?;
    manager.save(&state).await?;
    lock.release().await?;

    for address in &report.refreshed {
        println!("  {} {}", "✓".green(), address.cyan());
    }
    for address in &report.removed {
        println!(
            "  {} {} (サーバー上に存在しないためステートから削除)",
            "-".red(),
            address.cyan()
        );
    }
    println!();
    println!(
        "更新: {}件, 削除: {}件",
        report.refreshed.len(),
        report.removed.len()
    );
    Ok(())
}
