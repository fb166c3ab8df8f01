//! 展開キーと型付き参照

use super::kind::{ResourceClass, ResourceKind};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;

/// 展開キー（`"{templateKey}-{index}"`）
///
/// 同一クラス内ではテンプレートキーが一意で、インデックスもテンプレート内で
/// 一意なので、構築上衝突しない。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpandedKey(String);

impl ExpandedKey {
    pub fn new(template_key: &str, index: u32) -> Self {
        Self(format!("{template_key}-{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ExpandedKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpandedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 他クラスの展開済みリソースへの参照
///
/// 値は展開キー（例: `"database-1"`）でなければならない。テンプレートキーを
/// 渡しても解決時に完全一致しないため失敗する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct Ref<K> {
    key: String,
    #[serde(skip)]
    kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind> Ref<K> {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn class(&self) -> ResourceClass {
        K::CLASS
    }
}

impl<K> fmt::Display for Ref<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// 参照解決の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(bound = "")]
pub struct ResolvedRef<K> {
    /// 参照先の展開キー
    pub key: ExpandedKey,
    /// 参照先の解決済みリソース名
    pub name: String,
    #[serde(skip)]
    kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind> ResolvedRef<K> {
    pub fn new(key: ExpandedKey, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            kind: PhantomData,
        }
    }
}

/// エラー報告用のリソースアドレス（`bucket.assets-1` 形式）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceAddress {
    pub class: ResourceClass,
    pub key: String,
}

impl ResourceAddress {
    pub fn new(class: ResourceClass, key: impl Into<String>) -> Self {
        Self {
            class,
            key: key.into(),
        }
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class, self.key)
    }
}
