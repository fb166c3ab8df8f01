pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// ストレージ定義ファイルのパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "STOREFLOW_CONFIG_PATH";

const DEFAULTS_FILE: &str = "defaults.json";

/// StoreFlowの設定ディレクトリを取得
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("storeflow");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// プロジェクトのstorage.kdlファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 STOREFLOW_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: storage.local.kdl, .storage.local.kdl, storage.kdl, .storage.kdl
/// 3. ./.storeflow/ ディレクトリ内: 同様の順序
/// 4. ~/.config/storeflow/storage.kdl (グローバル設定)
pub fn find_storage_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;
    let candidates = [
        "storage.local.kdl",
        ".storage.local.kdl",
        "storage.kdl",
        ".storage.kdl",
    ];

    let search_dirs = [current_dir.clone(), current_dir.join(".storeflow")];
    for dir in search_dirs.iter().filter(|d| d.is_dir()) {
        if let Some(path) = candidates
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.exists())
        {
            return Ok(path);
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("storeflow").join("storage.kdl");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::StorageFileNotFound)
}

/// ユーザーごとのデフォルト値（`~/.config/storeflow/defaults.json`）
///
/// ```json
/// { "region": "nl-ams", "zone": "nl-ams-1", "tags": { "owner": "ops" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    pub region: Option<String>,
    pub zone: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl Defaults {
    /// ファイルから読み込む（存在しない場合は空のデフォルト）
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| ConfigError::InvalidDefaults {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// 設定ディレクトリの defaults.json を読み込む
pub fn load_defaults() -> Result<Defaults> {
    Defaults::load_from(&get_config_dir()?.join(DEFAULTS_FILE))
}
