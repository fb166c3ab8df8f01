//! バケット定義

use super::settings::Tags;
use serde::{Deserialize, Serialize};

pub const BUCKET_ACLS: &[&str] = &[
    "private",
    "public-read",
    "public-read-write",
    "authenticated-read",
];

pub const STORAGE_CLASSES: &[&str] = &["STANDARD", "ONEZONE_IA", "GLACIER"];

pub const CORS_METHODS: &[&str] = &["GET", "PUT", "POST", "DELETE", "HEAD"];

/// バケットテンプレート
///
/// KDL形式：
/// ```kdl
/// bucket "assets" {
///     name "acme-assets"
///     count 2
///     acl "private"
///     versioning #true
///     lifecycle "expire-logs" {
///         prefix "logs/"
///         expiration-days 30
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketTemplate {
    /// ベース名（必須。count > 1 のときは `-{index}` が付与される）
    pub name: String,
    pub count: i64,
    /// リージョン（未指定時はグローバル設定）
    pub region: Option<String>,
    pub acl: String,
    #[serde(default)]
    pub versioning: bool,
    #[serde(default)]
    pub object_lock: bool,
    #[serde(default)]
    pub force_destroy: bool,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub lifecycle_rules: Vec<LifecycleRule>,
    #[serde(default)]
    pub cors_rules: Vec<CorsRule>,
}

impl BucketTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 1,
            region: None,
            acl: "private".to_string(),
            versioning: false,
            object_lock: false,
            force_destroy: false,
            tags: Tags::new(),
            lifecycle_rules: Vec::new(),
            cors_rules: Vec::new(),
        }
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }
}

/// ライフサイクルルール
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleRule {
    pub id: String,
    pub prefix: Option<String>,
    pub enabled: bool,
    pub expiration_days: Option<i64>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
    pub abort_incomplete_upload_days: Option<i64>,
}

impl LifecycleRule {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prefix: None,
            enabled: true,
            expiration_days: None,
            transitions: Vec::new(),
            abort_incomplete_upload_days: None,
        }
    }
}

/// ストレージクラスの移行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub days: i64,
    pub storage_class: String,
}

/// CORSルール
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorsRule {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    #[serde(default)]
    pub allowed_headers: Vec<String>,
    #[serde(default)]
    pub expose_headers: Vec<String>,
    pub max_age_seconds: Option<i64>,
}
