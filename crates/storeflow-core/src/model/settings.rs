//! グローバル設定

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// タグ（キー順で保持し、出力を決定的にする）
pub type Tags = BTreeMap<String, String>;

pub const DEFAULT_REGION: &str = "fr-par";
pub const DEFAULT_ZONE: &str = "fr-par-1";

/// サポートされるオブジェクトストレージのリージョン
pub const REGIONS: &[&str] = &["fr-par", "nl-ams", "pl-waw"];

/// 全テンプレートに共通の設定
///
/// KDL形式：
/// ```kdl
/// settings {
///     region "fr-par"
///     zone "fr-par-1"
///     project-id "0c3a3b4e-..."
///     tags {
///         team "storage"
///     }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub region: Option<String>,
    pub zone: Option<String>,
    /// プロジェクトID（`project_name` と排他）
    pub project_id: Option<String>,
    /// プロジェクト名（`organization_id` と組み合わせて検索する）
    pub project_name: Option<String>,
    pub organization_id: Option<String>,
    /// 全リソースに付与するデフォルトタグ
    #[serde(default)]
    pub tags: Tags,
}

/// プロジェクトの指定方法
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectRef {
    Id(String),
    Lookup {
        name: String,
        organization_id: String,
    },
}

impl Settings {
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    pub fn zone(&self) -> &str {
        self.zone.as_deref().unwrap_or(DEFAULT_ZONE)
    }

    /// プロジェクト指定を返す（未指定または不完全な場合は None）
    pub fn project(&self) -> Option<ProjectRef> {
        match (&self.project_id, &self.project_name, &self.organization_id) {
            (Some(id), None, _) => Some(ProjectRef::Id(id.clone())),
            (None, Some(name), Some(org)) => Some(ProjectRef::Lookup {
                name: name.clone(),
                organization_id: org.clone(),
            }),
            _ => None,
        }
    }

    /// デフォルトタグにリソース固有のタグを重ねる（キー衝突時はリソース側が優先）
    pub fn merged_tags(&self, own: &Tags) -> Tags {
        let mut tags = self.tags.clone();
        tags.extend(own.iter().map(|(k, v)| (k.clone(), v.clone())));
        tags
    }

    /// 未設定の項目をユーザーデフォルトで補う
    ///
    /// 優先順位: ファイルの設定 > デフォルト。タグはデフォルトの上にファイルのタグを重ねる。
    pub fn apply_defaults(&mut self, region: Option<&str>, zone: Option<&str>, tags: &Tags) {
        if self.region.is_none() {
            self.region = region.map(|s| s.to_string());
        }
        if self.zone.is_none() {
            self.zone = zone.map(|s| s.to_string());
        }
        let mut merged = tags.clone();
        merged.append(&mut self.tags);
        self.tags = merged;
    }

    /// CLI引数・環境変数による上書き
    pub fn override_location(&mut self, region: Option<String>, zone: Option<String>) {
        if region.is_some() {
            self.region = region;
        }
        if zone.is_some() {
            self.zone = zone;
        }
    }
}
