use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("api-key '{0}' が重複して定義されています")]
    DuplicateApiKey(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
