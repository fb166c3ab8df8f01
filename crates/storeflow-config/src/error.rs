use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "ストレージ定義ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: storage.local.kdl, .storage.local.kdl, storage.kdl, .storage.kdl\n\
        - ./.storeflow/ ディレクトリ\n\
        - ~/.config/storeflow/storage.kdl\n\
        または STOREFLOW_CONFIG_PATH 環境変数で直接指定できます"
    )]
    StorageFileNotFound,

    #[error("デフォルト設定の読み込みに失敗しました: {path}: {source}")]
    InvalidDefaults {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
