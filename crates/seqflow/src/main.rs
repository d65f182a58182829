mod commands;
mod utils;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use seqflow_config::ProviderConfig;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "seqflow")]
#[command(about = "Seq の API キーを宣言的に管理する", long_about = None)]
struct Cli {
    /// 設定ファイルのパス（省略時は seq.kdl を自動検出）
    #[arg(short = 'f', long = "file", global = true, env = "SEQFLOW_CONFIG_PATH")]
    file: Option<PathBuf>,

    #[command(flatten)]
    provider: ProviderArgs,

    #[command(subcommand)]
    command: Commands,
}

/// 接続設定（seq.kdl の provider ブロックと SEQ_* 環境変数より優先）
#[derive(Args, Debug, Default)]
struct ProviderArgs {
    /// SeqサーバーのURL (例: http://localhost:5342) [環境変数: SEQ_SERVER_URL]
    #[arg(long, global = true)]
    server_url: Option<String>,

    /// 管理用APIキー [環境変数: SEQ_API_KEY]
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// TLS証明書の検証をスキップ。=false で環境変数を打ち消す [環境変数: SEQ_INSECURE_SKIP_VERIFY]
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    insecure_skip_verify: Option<bool>,

    /// リクエストのタイムアウト秒数 (デフォルト: 30) [環境変数: SEQ_TIMEOUT_SECONDS]
    #[arg(long, global = true)]
    timeout_seconds: Option<u64>,
}

impl ProviderArgs {
    fn into_config(self) -> ProviderConfig {
        ProviderConfig {
            server_url: self.server_url,
            api_key: self.api_key,
            insecure_skip_verify: self.insecure_skip_verify,
            timeout_seconds: self.timeout_seconds,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 設定ファイルを検証
    Validate,
    /// 変更内容を表示
    Plan {
        /// サーバーから状態を再取得しない
        #[arg(long)]
        no_refresh: bool,
    },
    /// 変更を適用
    Apply {
        /// 確認なしで実行
        #[arg(short, long)]
        yes: bool,
    },
    /// サーバーの状態をステートに反映
    Refresh,
    /// 既存のAPIキーをステートに取り込む
    Import {
        /// seq.kdl 上のアドレス (api-key "<address>")
        address: String,
        /// SeqのAPIキーID (例: ApiKey-123)
        id: String,
    },
    /// 管理下のAPIキーをすべて削除
    Destroy {
        /// 確認なしで実行
        #[arg(short, long)]
        yes: bool,
    },
    /// Seqサーバーのヘルスチェック
    Health,
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログはstderrへ（stdoutはコマンド出力用）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Versionコマンドは設定ファイル不要
    if matches!(cli.command, Commands::Version) {
        println!("seqflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Ctrl-C はトークン経由で各コマンドに伝える
    // apply/destroy は実行中のアクションを終えてステートを保存してから止まる
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!();
                eprintln!(
                    "{}",
                    "中断しています...（もう一度 Ctrl-C で強制終了）".yellow()
                );
                cancel.cancel();
            }
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(130);
            }
        }
    });

    run(cli, &cancel).await
}

async fn run(cli: Cli, cancel: &CancellationToken) -> anyhow::Result<()> {
    let file = cli.file;
    let overrides = cli.provider.into_config();

    match cli.command {
        Commands::Validate => commands::validate::handle(file.as_deref()),
        Commands::Plan { no_refresh } => {
            utils::interruptible(
                cancel,
                commands::plan::handle(file.as_deref(), overrides, no_refresh),
            )
            .await
        }
        Commands::Apply { yes } => {
            commands::apply::handle(file.as_deref(), overrides, yes, cancel).await
        }
        Commands::Refresh => {
            utils::interruptible(cancel, commands::refresh::handle(file.as_deref(), overrides))
                .await
        }
        Commands::Import { address, id } => {
            utils::interruptible(
                cancel,
                commands::import::handle(file.as_deref(), overrides, &address, &id),
            )
            .await
        }
        Commands::Destroy { yes } => {
            commands::destroy::handle(file.as_deref(), overrides, yes, cancel).await
        }
        Commands::Health => {
            utils::interruptible(cancel, commands::health::handle(file.as_deref(), overrides))
                .await
        }
        Commands::Version => Ok(()),
    }
}
