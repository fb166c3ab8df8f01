//! KDLパーサー
//!
//! storage.kdl をパースして [`TemplateSet`] を生成します。
//! 各ノードタイプのパース処理はモジュールに分離されています。

mod block;
mod bucket;
mod object;
mod settings;

use block::{parse_snapshot, parse_volume};
use bucket::parse_bucket;
use object::{parse_lock, parse_object, parse_policy};
use settings::parse_settings;

use crate::error::{Result, StoreError};
use crate::model::{ResourceClass, Tags, TemplateSet};
use kdl::{KdlDocument, KdlNode, KdlValue};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// KDLファイルをパースしてTemplateSetを生成
pub fn parse_kdl_file<P: AsRef<Path>>(path: P) -> Result<TemplateSet> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| StoreError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_kdl_string(&content)
}

/// KDL文字列をパース
pub fn parse_kdl_string(content: &str) -> Result<TemplateSet> {
    let doc: KdlDocument = content.parse()?;
    let mut set = TemplateSet::new();
    let mut seen_settings = false;

    for node in doc.nodes() {
        match node.name().value() {
            "settings" => {
                if seen_settings {
                    return Err(StoreError::InvalidConfig(
                        "settings は1つだけ定義できます".to_string(),
                    ));
                }
                set.settings = parse_settings(node)?;
                seen_settings = true;
            }
            "bucket" => {
                let (key, bucket) = parse_bucket(node)?;
                insert_unique(&mut set.buckets, ResourceClass::Bucket, key, bucket)?;
            }
            "volume" => {
                let (key, volume) = parse_volume(node)?;
                insert_unique(&mut set.volumes, ResourceClass::Volume, key, volume)?;
            }
            "snapshot" => {
                let (key, snapshot) = parse_snapshot(node)?;
                insert_unique(&mut set.snapshots, ResourceClass::Snapshot, key, snapshot)?;
            }
            "object" => {
                let (key, object) = parse_object(node)?;
                insert_unique(&mut set.objects, ResourceClass::Object, key, object)?;
            }
            "policy" => {
                let (key, policy) = parse_policy(node)?;
                insert_unique(&mut set.policies, ResourceClass::Policy, key, policy)?;
            }
            "lock" => {
                let (key, lock) = parse_lock(node)?;
                insert_unique(&mut set.locks, ResourceClass::Lock, key, lock)?;
            }
            other => {
                // 不明なノードはスキップ
                tracing::warn!(node = other, "Skipping unknown top-level node");
            }
        }
    }

    Ok(set)
}

fn insert_unique<T>(
    map: &mut BTreeMap<String, T>,
    class: ResourceClass,
    key: String,
    value: T,
) -> Result<()> {
    if map.contains_key(&key) {
        return Err(StoreError::DuplicateTemplate {
            class: class.as_str(),
            key,
        });
    }
    map.insert(key, value);
    Ok(())
}

/// 位置引数（プロパティ以外のエントリ）
fn arguments(node: &KdlNode) -> impl Iterator<Item = &KdlValue> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .map(|e| e.value())
}

/// テンプレートキー（最初の位置引数）を取得
fn template_key(node: &KdlNode, class: ResourceClass) -> Result<String> {
    arguments(node)
        .next()
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
        .ok_or_else(|| StoreError::InvalidConfig(format!("{class} にはキーを指定してください")))
}

fn string_arg(node: &KdlNode) -> Result<String> {
    arguments(node)
        .next()
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            StoreError::InvalidConfig(format!(
                "{} には文字列を指定してください",
                node.name().value()
            ))
        })
}

fn string_args(node: &KdlNode) -> Vec<String> {
    arguments(node)
        .filter_map(|v| v.as_string().map(|s| s.to_string()))
        .collect()
}

fn integer_value(node: &KdlNode, value: Option<&KdlValue>) -> Result<i64> {
    value
        .and_then(|v| v.as_integer())
        .and_then(|v| i64::try_from(v).ok())
        .ok_or_else(|| {
            StoreError::InvalidConfig(format!(
                "{} には整数を指定してください",
                node.name().value()
            ))
        })
}

fn integer_arg(node: &KdlNode) -> Result<i64> {
    integer_value(node, arguments(node).next())
}

fn integer_prop(node: &KdlNode, key: &str) -> Result<i64> {
    integer_value(node, node.get(key))
}

/// 真偽値。引数なし（`versioning`）は true とみなす
fn bool_arg(node: &KdlNode) -> Result<bool> {
    match arguments(node).next() {
        None => Ok(true),
        Some(value) => value.as_bool().ok_or_else(|| {
            StoreError::InvalidConfig(format!(
                "{} には #true または #false を指定してください",
                node.name().value()
            ))
        }),
    }
}

fn string_prop(node: &KdlNode, key: &str) -> Result<String> {
    node.get(key)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            StoreError::InvalidConfig(format!(
                "{} には {}=\"...\" が必要です",
                node.name().value(),
                key
            ))
        })
}

/// tags ブロックをパース
///
/// 例: tags { env "prod"; team "storage" }
fn parse_tags(node: &KdlNode) -> Result<Tags> {
    let mut tags = Tags::new();
    if let Some(children) = node.children() {
        for child in children.nodes() {
            let key = child.name().value();
            let value = arguments(child)
                .next()
                .and_then(|v| v.as_string())
                .ok_or_else(|| {
                    StoreError::InvalidConfig(format!(
                        "タグ '{key}' の値には文字列を指定してください"
                    ))
                })?;
            tags.insert(key.to_string(), value.to_string());
        }
    }
    Ok(tags)
}

fn unknown_field(owner: &str, key: &str, field: &str) -> StoreError {
    StoreError::InvalidConfig(format!("{owner} '{key}' に未知のフィールド '{field}' があります"))
}

#[cfg(test)]
mod tests;
