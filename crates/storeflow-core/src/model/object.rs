//! バケットに付随するリソース（オブジェクト・ポリシー・ロック設定）

use super::kind::Bucket;
use super::reference::Ref;
use super::settings::Tags;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const VISIBILITIES: &[&str] = &["private", "public-read"];

pub const LOCK_MODES: &[&str] = &["GOVERNANCE", "COMPLIANCE"];

pub const MAX_RETENTION_DAYS: i64 = 36_500;
pub const MAX_RETENTION_YEARS: i64 = 100;

/// オブジェクトテンプレート
///
/// `file` と `content` はちょうど一方だけを指定する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectTemplate {
    /// 配置先バケットの展開キー
    pub bucket: Ref<Bucket>,
    /// オブジェクトキー（`/` で始まってはならない）
    pub key: String,
    pub file: Option<PathBuf>,
    pub content: Option<String>,
    pub content_type: Option<String>,
    pub visibility: String,
    #[serde(default)]
    pub tags: Tags,
}

impl ObjectTemplate {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: Ref::new(bucket),
            key: key.into(),
            file: None,
            content: None,
            content_type: None,
            visibility: "private".to_string(),
            tags: Tags::new(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn body(&self) -> Option<ObjectBody> {
        match (&self.file, &self.content) {
            (Some(path), None) => Some(ObjectBody::File { path: path.clone() }),
            (None, Some(content)) => Some(ObjectBody::Content {
                content: content.clone(),
            }),
            _ => None,
        }
    }
}

/// オブジェクトの中身
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectBody {
    File { path: PathBuf },
    Content { content: String },
}

/// バケットポリシーテンプレート
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyTemplate {
    pub bucket: Ref<Bucket>,
    /// ポリシードキュメント（JSON）
    pub document: String,
}

impl PolicyTemplate {
    pub fn new(bucket: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            bucket: Ref::new(bucket),
            document: document.into(),
        }
    }
}

/// オブジェクトロック設定テンプレート
///
/// `days` と `years` はちょうど一方だけを指定する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockTemplate {
    pub bucket: Ref<Bucket>,
    pub mode: String,
    pub days: Option<i64>,
    pub years: Option<i64>,
}

impl LockTemplate {
    pub fn new(bucket: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            bucket: Ref::new(bucket),
            mode: mode.into(),
            days: None,
            years: None,
        }
    }

    pub fn with_days(mut self, days: i64) -> Self {
        self.days = Some(days);
        self
    }

    pub fn with_years(mut self, years: i64) -> Self {
        self.years = Some(years);
        self
    }

    pub fn retention(&self) -> Option<Retention> {
        match (self.days, self.years) {
            (Some(days), None) => Some(Retention::Days(days)),
            (None, Some(years)) => Some(Retention::Years(years)),
            _ => None,
        }
    }
}

/// デフォルト保持期間
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retention {
    Days(i64),
    Years(i64),
}

impl std::fmt::Display for Retention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Retention::Days(days) => write!(f, "{days} days"),
            Retention::Years(years) => write!(f, "{years} years"),
        }
    }
}
