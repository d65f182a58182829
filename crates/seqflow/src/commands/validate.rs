use crate::utils;
use colored::Colorize;
use std::path::Path;

pub fn handle(file: Option<&Path>) -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());

    let project = match utils::load_project(file) {
        Ok(project) => project,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 設定エラー".red().bold());
            eprintln!("  {}", e);
            eprintln!();
            eprintln!("seq.kdl が存在するディレクトリで実行してください");
            std::process::exit(1);
        }
    };

    utils::print_loaded_config_file(&project);
    println!("{}", "✓ 設定ファイルは正常です！".green().bold());
    println!();
    println!("サマリー:");
    println!("  プロジェクト: {}", project.flow.name.cyan());

    let server = project
        .flow
        .provider
        .server_url
        .as_deref()
        .unwrap_or("(未設定: SEQ_SERVER_URL を使用)");
    println!("  サーバー: {}", server);

    println!("  APIキー: {}個", project.flow.api_keys.len());
    for (address, api_key) in &project.flow.api_keys {
        let permissions = match &api_key.permissions {
            Some(p) if p.is_empty() => "権限なし".to_string(),
            Some(p) => p.iter().cloned().collect::<Vec<_>>().join(", "),
            None => "(未管理)".to_string(),
        };
        println!(
            "    - {} ({}) [{}]",
            address.cyan(),
            api_key.title,
            permissions
        );
    }

    Ok(())
}
