//! 展開済みインスタンスと計画

use super::block::{ObjectLocator, SnapshotSource, SnapshotTemplate, VolumeTemplate};
use super::bucket::BucketTemplate;
use super::kind::{Bucket, ResourceKind, Snapshot, Volume};
use super::object::{ObjectBody, ObjectTemplate, Retention};
use super::reference::{ExpandedKey, ResolvedRef};
use super::settings::{Settings, Tags};
use serde::Serialize;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// テンプレートから展開された具体的なリソース1件
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance<T> {
    pub key: ExpandedKey,
    /// 展開元テンプレートのキー（グルーピング用）
    pub template_key: String,
    /// 1始まりのインデックス
    pub index: u32,
    /// 解決済みリソース名
    pub name: String,
    /// バケットはリージョン、ボリューム/スナップショットはゾーン
    pub location: String,
    /// グローバルタグとマージ済みのタグ
    pub tags: Tags,
    /// テンプレートの属性（そのまま引き継ぐ）
    pub spec: T,
}

pub type BucketInstance = Instance<BucketTemplate>;
pub type VolumeInstance = Instance<VolumeTemplate>;

/// 展開済みマップ
///
/// 展開キー → インスタンス に加え、テンプレートキーごとの展開キー一覧を保持する
/// （曖昧な参照の診断に使う）。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound(serialize = "T: Serialize"))]
pub struct ExpandedMap<K, T> {
    #[serde(flatten)]
    instances: BTreeMap<ExpandedKey, T>,
    #[serde(skip)]
    by_template: BTreeMap<String, Vec<ExpandedKey>>,
    #[serde(skip)]
    kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind, T> Default for ExpandedMap<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ResourceKind, T> ExpandedMap<K, T> {
    pub fn new() -> Self {
        Self {
            instances: BTreeMap::new(),
            by_template: BTreeMap::new(),
            kind: PhantomData,
        }
    }

    pub fn insert(&mut self, template_key: &str, key: ExpandedKey, value: T) {
        self.by_template
            .entry(template_key.to_string())
            .or_default()
            .push(key.clone());
        self.instances.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.instances.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.instances.contains_key(key)
    }

    /// テンプレートキーから展開された全キー（インデックス順）
    pub fn keys_of_template(&self, template_key: &str) -> Option<&[ExpandedKey]> {
        self.by_template.get(template_key).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ExpandedKey> {
        self.instances.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.instances.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ExpandedKey, &T)> {
        self.instances.iter()
    }
}

/// 参照解決前のスナップショット
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotDraft {
    pub instance: Instance<SnapshotTemplate>,
    pub source: SnapshotSource,
    /// インスタンスごとに重複排除済みのエクスポート先
    pub export: Option<ObjectLocator>,
}

/// 解決済みのスナップショット作成元
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "provenance", rename_all = "snake_case")]
pub enum Provenance {
    Volume { volume: ResolvedRef<Volume> },
    Import { locator: ObjectLocator },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotInstance {
    #[serde(flatten)]
    pub instance: Instance<SnapshotTemplate>,
    pub provenance: Provenance,
    pub export: Option<ObjectLocator>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectPlacement {
    pub key: String,
    pub bucket: ResolvedRef<Bucket>,
    pub body: ObjectBody,
    pub tags: Tags,
    pub spec: ObjectTemplate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyAttachment {
    pub key: String,
    pub bucket: ResolvedRef<Bucket>,
    pub document: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LockAttachment {
    pub key: String,
    pub bucket: ResolvedRef<Bucket>,
    pub mode: String,
    pub retention: Retention,
}

/// 計画パスの出力
///
/// プロビジョニング実行側はこの内容だけを見てリソースを作成する。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoragePlan {
    pub settings: Settings,
    pub buckets: ExpandedMap<Bucket, BucketInstance>,
    pub volumes: ExpandedMap<Volume, VolumeInstance>,
    pub snapshots: ExpandedMap<Snapshot, SnapshotInstance>,
    pub objects: BTreeMap<String, ObjectPlacement>,
    pub policies: BTreeMap<String, PolicyAttachment>,
    pub locks: BTreeMap<String, LockAttachment>,
}

impl StoragePlan {
    /// 作成されるリソースの総数
    pub fn resource_count(&self) -> usize {
        self.buckets.len()
            + self.volumes.len()
            + self.snapshots.len()
            + self.objects.len()
            + self.policies.len()
            + self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resource_count() == 0
    }
}
