//! リソース種別
//!
//! 型付き参照 [`Ref`](super::Ref) の対象クラスを型レベルで表すマーカー型と、
//! エラー報告などで使う実行時の識別子 [`ResourceClass`] を定義します。

use serde::{Deserialize, Serialize};
use std::fmt;

/// リソースクラス（実行時表現）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceClass {
    Bucket,
    Volume,
    Snapshot,
    Object,
    Policy,
    Lock,
}

impl ResourceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceClass::Bucket => "bucket",
            ResourceClass::Volume => "volume",
            ResourceClass::Snapshot => "snapshot",
            ResourceClass::Object => "object",
            ResourceClass::Policy => "policy",
            ResourceClass::Lock => "lock",
        }
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 型レベルのリソースクラス
pub trait ResourceKind {
    const CLASS: ResourceClass;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bucket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Volume;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Snapshot;

impl ResourceKind for Bucket {
    const CLASS: ResourceClass = ResourceClass::Bucket;
}

impl ResourceKind for Volume {
    const CLASS: ResourceClass = ResourceClass::Volume;
}

impl ResourceKind for Snapshot {
    const CLASS: ResourceClass = ResourceClass::Snapshot;
}
