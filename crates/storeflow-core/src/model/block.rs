//! ブロックストレージ（ボリューム・スナップショット）定義

use super::kind::Volume;
use super::reference::Ref;
use super::settings::Tags;
use serde::{Deserialize, Serialize};

/// IOPS ティア
pub const IOPS_TIERS: &[i64] = &[5000, 15000];
pub const DEFAULT_IOPS: i64 = 5000;

pub const MIN_VOLUME_SIZE_GB: i64 = 5;
pub const MAX_VOLUME_SIZE_GB: i64 = 10_000;

/// スナップショットのインポート/エクスポートで受け付けるイメージ拡張子
///
/// `.qcow2` を先に判定する。
pub const SNAPSHOT_IMAGE_SUFFIXES: &[&str] = &[".qcow2", ".qcow"];

/// ボリュームテンプレート
///
/// KDL形式：
/// ```kdl
/// volume "database" {
///     size 50
///     iops 15000
///     zone "fr-par-2"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeTemplate {
    /// ベース名（未指定時は `{key}-volume`）
    pub name: Option<String>,
    pub count: i64,
    pub size_gb: i64,
    pub iops: i64,
    pub zone: Option<String>,
    /// 作成元スナップショットのID（外部で管理されるもの）
    pub snapshot_id: Option<String>,
    #[serde(default)]
    pub tags: Tags,
}

impl VolumeTemplate {
    pub fn new(size_gb: i64) -> Self {
        Self {
            name: None,
            count: 1,
            size_gb,
            iops: DEFAULT_IOPS,
            zone: None,
            snapshot_id: None,
            tags: Tags::new(),
        }
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// オブジェクトストレージ上の位置（バケット名 + キー）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectLocator {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocator {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// スナップショットテンプレート
///
/// `volume` と `import` はちょうど一方だけを指定する。
///
/// KDL形式：
/// ```kdl
/// snapshot "backup" {
///     count 3
///     volume "database-1"
///     export bucket="acme-backups" key="db.qcow2"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTemplate {
    /// ベース名（未指定時は `{key}-snapshot`）
    pub name: Option<String>,
    pub count: i64,
    pub zone: Option<String>,
    /// 作成元ボリュームの展開キー
    pub volume: Option<Ref<Volume>>,
    /// QCOW2 イメージからのインポート元
    pub import: Option<ObjectLocator>,
    /// QCOW2 イメージとしてのエクスポート先
    pub export: Option<ObjectLocator>,
    #[serde(default)]
    pub tags: Tags,
}

impl SnapshotTemplate {
    pub fn from_volume(volume_key: impl Into<String>) -> Self {
        Self {
            count: 1,
            volume: Some(Ref::new(volume_key)),
            ..Default::default()
        }
    }

    pub fn from_import(locator: ObjectLocator) -> Self {
        Self {
            count: 1,
            import: Some(locator),
            ..Default::default()
        }
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }

    pub fn with_export(mut self, export: ObjectLocator) -> Self {
        self.export = Some(export);
        self
    }

    /// 作成元を直和型として返す（ちょうど一方が指定されている場合のみ）
    pub fn source(&self) -> Option<SnapshotSource> {
        match (&self.volume, &self.import) {
            (Some(volume), None) => Some(SnapshotSource::Volume {
                volume: volume.clone(),
            }),
            (None, Some(locator)) => Some(SnapshotSource::Import {
                locator: locator.clone(),
            }),
            _ => None,
        }
    }
}

/// スナップショットの作成元
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provenance", rename_all = "snake_case")]
pub enum SnapshotSource {
    Volume { volume: Ref<Volume> },
    Import { locator: ObjectLocator },
}
