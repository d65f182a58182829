use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Missing Seq server_url: configure the provider with server-url or set SEQ_SERVER_URL"
    )]
    MissingServerUrl,

    #[error("Invalid server_url: {0}")]
    InvalidServerUrl(String),

    #[error(
        "設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: seq.kdl, seq.local.kdl, .seq.kdl, .seq.local.kdl\n\
        - ./.seqflow/ ディレクトリ\n\
        または SEQFLOW_CONFIG_PATH 環境変数で直接指定できます"
    )]
    FlowFileNotFound,

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
