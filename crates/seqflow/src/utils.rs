use colored::Colorize;
use seqflow_client::SeqClient;
use seqflow_cloud::{ActionType, ApplyResult, Plan, StateManager};
use seqflow_config::ProviderConfig;
use seqflow_core::Flow;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// 読み込んだプロジェクト
pub struct Project {
    pub flow_path: PathBuf,
    pub root: PathBuf,
    pub flow: Flow,
}

impl Project {
    pub fn state_manager(&self) -> StateManager {
        StateManager::new(&self.root)
    }

    /// CLIフラグ > provider ブロック > 環境変数
    pub fn provider_config(&self, overrides: ProviderConfig) -> ProviderConfig {
        self.flow.provider.clone().overlay(overrides)
    }
}

/// 設定ファイルを探してパースする
pub fn load_project(file: Option<&Path>) -> anyhow::Result<Project> {
    let flow_path = match file {
        Some(path) => {
            if !path.exists() {
                return Err(anyhow::anyhow!(
                    "設定ファイルが見つかりません: {}",
                    path.display()
                ));
            }
            path.to_path_buf()
        }
        None => seqflow_config::find_flow_file()?,
    };

    let flow = seqflow_core::parse_kdl_file(&flow_path)?;
    let root = project_root(&flow_path);
    tracing::debug!("Project root: {}", root.display());

    Ok(Project {
        flow_path,
        root,
        flow,
    })
}

/// 設定ファイルのあるディレクトリ（.seqflow/ 内ならその親）
fn project_root(flow_path: &Path) -> PathBuf {
    let dir = flow_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    match dir.file_name().and_then(|n| n.to_str()) {
        Some(".seqflow") => dir.parent().unwrap_or(dir).to_path_buf(),
        _ => dir.to_path_buf(),
    }
}

/// Ctrl-C で future ごと破棄する（サーバーを変更しない処理専用）
pub async fn interruptible<T, F>(cancel: &CancellationToken, fut: F) -> anyhow::Result<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    tokio::select! {
        result = fut => result,
        _ = cancel.cancelled() => Err(interrupted()),
    }
}

pub fn interrupted() -> anyhow::Error {
    anyhow::anyhow!("ユーザーにより中断されました")
}

/// Seqサーバーに接続
pub async fn connect(config: &ProviderConfig) -> anyhow::Result<SeqClient> {
    let settings = config.resolve()?;
    println!("Seqサーバー: {}", settings.server_url.as_str().cyan());
    Ok(SeqClient::connect(&settings).await?)
}

/// 読み込んだ設定ファイル情報を表示
pub fn print_loaded_config_file(project: &Project) {
    println!(
        "📄 読み込んだ設定ファイル: {}",
        project.flow_path.display().to_string().cyan()
    );
}

/// プランを表示
pub fn print_plan(plan: &Plan) {
    if !plan.has_changes {
        println!("{}", "✓ 変更はありません".green());
        return;
    }

    for action in &plan.actions {
        let marker = match action.action_type {
            ActionType::Create => "+".green().bold(),
            ActionType::Update => "~".yellow().bold(),
            ActionType::Delete => "-".red().bold(),
            ActionType::NoOp => continue,
        };
        println!(
            "  {} {}.{}: {}",
            marker,
            action.resource_type.dimmed(),
            action.address.cyan(),
            action.description
        );
        for change in &action.changes {
            println!("      {}", change.dimmed());
        }
    }

    println!();
    println!("{}", format!("Plan: {}", plan.summary()).bold());
}

/// 適用結果を表示
pub fn print_apply_result(result: &ApplyResult) {
    for ok in &result.succeeded {
        println!("  {} {}", "✓".green(), ok.message);
    }
    for failed in &result.failed {
        eprintln!(
            "  {} {}: {}",
            "✗".red(),
            failed.address.cyan(),
            failed.error.as_deref().unwrap_or("unknown error")
        );
    }

    if result.interrupted {
        eprintln!(
            "  {} 中断したため残りのアクションは実行していません",
            "!".yellow()
        );
    }

    println!();
    println!(
        "完了: 成功 {}件, 失敗 {}件 ({}ms)",
        result.succeeded.len(),
        result.failed.len(),
        result.duration_ms
    );
}
