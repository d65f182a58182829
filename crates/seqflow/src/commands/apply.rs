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
    println!("{}", "変更を適用します...".blue().bold());
    let project = utils::load_project(file)?;
    utils::print_loaded_config_file(&project);

    let manager = project.state_manager();
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    // ここまではサーバーを変更しないので、中断時はそのまま破棄する
    let engine = utils::interruptible(cancel, async {
        let client = utils::connect(&project.provider_config(overrides)).await?;
        let engine = Engine::new(client);
        engine.refresh(&mut state).await?;
        Ok::<_, anyhow::Error>(engine)
    })
    .await?;

    println!();
    let plan = Plan::build(&project.flow.api_keys, &state);
    utils::print_plan(&plan);

    if !plan.has_changes {
        manager.save(&state).await?;
        lock.release().await?;
        return Ok(());
    }

    // 確認（--yesが指定されていない場合）
    if !yes {
        println!();
        println!("実行するには --yes オプションを指定してください");
        lock.release().await?;
        return Ok(());
    }

    println!();
    // Ctrl-C は実行中のアクションの完了を待ってから止まる
    let result = engine
        .apply(&plan, &project.flow.api_keys, &mut state, cancel)
        .await;

    // 失敗・中断しても成功した分のステート（トークンを含む）は保存する
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
    println!("{}", "✓ 適用が完了しました".green().bold());
    Ok(())
}
