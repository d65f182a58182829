use crate::utils;
use colored::Colorize;
use seqflow_cloud::{Engine, Plan};
use seqflow_config::ProviderConfig;
use std::path::Path;
use tokio_util::sync::CancellationToken;

pub async fn handle(
    file: Option<&Path>,
    overrides: ProviderConfig,
    yes: bool,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let project = utils::load_project(file)?;
    utils::print_loaded_config_file(&project);

    let manager = project.state_manager();
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    let plan = Plan::destroy(&state);
    println!();
    utils::print_plan(&plan);

    if !plan.has_changes {
        lock.release().await?;
        return Ok(());
    }

    // 確認（--yesが指定されていない場合）
    if !yes {
        println!();
        println!(
            "{}",
            "警告: 管理下のAPIキーをすべて削除します。".yellow()
        );
        println!("実行するには --yes オプションを指定してください");
        lock.release().await?;
        return Ok(());
    }

    let client =
        utils::interruptible(cancel, utils::connect(&project.provider_config(overrides))).await?;
    // Ctrl-C は実行中の削除の完了を待ってから止まる
    let result = Engine::new(client).destroy_all(&mut state, cancel).await;
    manager.save(&state).await?;
    lock.release().await?;

    utils::print_apply_result(&result);
    if result.interrupted {
        return Err(utils::interrupted());
    }
    if !result.is_success() {
        return Err(anyhow::anyhow!(
            "{}件のアクションが失敗しました",
            result.failed.len()
        ));
    }
    Ok(())
}
