use crate::utils;
use colored::Colorize;
use seqflow_cloud::{Engine, Plan};
use seqflow_config::ProviderConfig;
use std::path::Path;

pub async fn handle(
    file: Option<&Path>,
    overrides: ProviderConfig,
    no_refresh: bool,
) -> anyhow::Result<()> {
    let project = utils::load_project(file)?;
    utils::print_loaded_config_file(&project);

    let mut state = project.state_manager().load().await?;

    if !no_refresh && !state.api_keys.is_empty() {
        let client = utils::connect(&project.provider_config(overrides)).await?;
        println!("{}", "状態を更新中...".blue());
        let report = Engine::new(client).refresh(&mut state).await?;
        for address in &report.removed {
            println!(
                "  {} {} はサーバー上に存在しません",
                "!".yellow(),
                address.cyan()
            );
        }
    }

    println!();
    let plan = Plan::build(&project.flow.api_keys, &state);
    utils::print_plan(&plan);

    Ok(())
}
