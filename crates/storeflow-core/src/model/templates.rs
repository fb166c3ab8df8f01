//! テンプレート集合

use super::block::{SnapshotTemplate, VolumeTemplate};
use super::bucket::BucketTemplate;
use super::kind::{self, ResourceKind};
use super::object::{LockTemplate, ObjectTemplate, PolicyTemplate};
use super::settings::{Settings, Tags};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `count` で複数インスタンスに展開されるテンプレート
pub trait Template: Clone {
    type Kind: ResourceKind;

    /// 既定名に付けるクラス接尾辞（バケットは名前必須なので None）
    const NAME_SUFFIX: Option<&'static str>;

    fn count(&self) -> i64;

    fn base_name(&self) -> Option<&str>;

    fn tags(&self) -> &Tags;

    /// 実効ロケーション（バケットはリージョン、ブロックストレージはゾーン）
    fn location<'a>(&'a self, settings: &'a Settings) -> &'a str;
}

impl Template for BucketTemplate {
    type Kind = kind::Bucket;
    const NAME_SUFFIX: Option<&'static str> = None;

    fn count(&self) -> i64 {
        self.count
    }

    fn base_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }

    fn location<'a>(&'a self, settings: &'a Settings) -> &'a str {
        self.region.as_deref().unwrap_or_else(|| settings.region())
    }
}

impl Template for VolumeTemplate {
    type Kind = kind::Volume;
    const NAME_SUFFIX: Option<&'static str> = Some("volume");

    fn count(&self) -> i64 {
        self.count
    }

    fn base_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }

    fn location<'a>(&'a self, settings: &'a Settings) -> &'a str {
        self.zone.as_deref().unwrap_or_else(|| settings.zone())
    }
}

impl Template for SnapshotTemplate {
    type Kind = kind::Snapshot;
    const NAME_SUFFIX: Option<&'static str> = Some("snapshot");

    fn count(&self) -> i64 {
        self.count
    }

    fn base_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }

    fn location<'a>(&'a self, settings: &'a Settings) -> &'a str {
        self.zone.as_deref().unwrap_or_else(|| settings.zone())
    }
}

/// 1回の計画パスへの入力
///
/// 各マップのキーはテンプレートキー。BTreeMap なので走査順は決定的。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateSet {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub buckets: BTreeMap<String, BucketTemplate>,
    #[serde(default)]
    pub volumes: BTreeMap<String, VolumeTemplate>,
    #[serde(default)]
    pub snapshots: BTreeMap<String, SnapshotTemplate>,
    #[serde(default)]
    pub objects: BTreeMap<String, ObjectTemplate>,
    #[serde(default)]
    pub policies: BTreeMap<String, PolicyTemplate>,
    #[serde(default)]
    pub locks: BTreeMap<String, LockTemplate>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// テンプレートの総数
    pub fn len(&self) -> usize {
        self.buckets.len()
            + self.volumes.len()
            + self.snapshots.len()
            + self.objects.len()
            + self.policies.len()
            + self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
