//! テンプレートのバリデーション
//!
//! 展開前に構造上の不変条件を検査する。最初のエラーで止めず、バッチ内の
//! 全ての問題を収集してから返す。1件でも問題があればバッチ全体を拒否する。
//!
//! 検査に通ったテンプレート集合だけが [`ValidatedTemplates`] になり、
//! 展開処理はこの型しか受け付けない。

use crate::expand::resolved_name;
use crate::export_path::recognized_suffix;
use crate::model::{
    BUCKET_ACLS, BucketTemplate, CORS_METHODS, CorsRule, IOPS_TIERS, LOCK_MODES, LifecycleRule,
    LockTemplate, MAX_RETENTION_DAYS, MAX_RETENTION_YEARS, MAX_VOLUME_SIZE_GB, MIN_VOLUME_SIZE_GB,
    ObjectLocator, ObjectTemplate, PolicyTemplate, REGIONS, ResourceClass, STORAGE_CLASSES,
    Settings, SnapshotTemplate, Template, TemplateSet, VISIBILITIES, VolumeTemplate,
};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

pub const MIN_COUNT: i64 = 1;
pub const MAX_COUNT: i64 = 1000;

const MAX_BUCKET_NAME_LEN: usize = 63;
const MAX_BLOCK_NAME_LEN: usize = 63;

static TEMPLATE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("valid regex"));

static BUCKET_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9.-]{1,61}[a-z0-9]$").expect("valid regex"));

static BLOCK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]{0,62}$").expect("valid regex"));

static ZONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}-[a-z]{3}-[1-9]$").expect("valid regex"));

/// バリデーションで見つかった問題1件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// `settings` または `{class}.{templateKey}`
    pub subject: String,
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn template(
        class: ResourceClass,
        key: &str,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            subject: format!("{class}.{key}"),
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn settings(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: "settings".to_string(),
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.subject, self.field, self.message)
    }
}

/// バリデーション済みのテンプレート集合
///
/// [`validate`] だけが構築できる。
#[derive(Debug, Clone, Copy)]
pub struct ValidatedTemplates<'a>(&'a TemplateSet);

impl<'a> ValidatedTemplates<'a> {
    pub fn templates(&self) -> &'a TemplateSet {
        self.0
    }
}

/// 1テンプレート分の問題を収集するためのヘルパー
struct Issues<'a> {
    class: ResourceClass,
    key: &'a str,
    out: &'a mut Vec<ValidationIssue>,
}

impl Issues<'_> {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.out
            .push(ValidationIssue::template(self.class, self.key, field, message));
    }

    fn check(&mut self, ok: bool, field: &str, message: impl FnOnce() -> String) {
        if !ok {
            self.push(field, message());
        }
    }

    fn key(&mut self) {
        let key = self.key;
        self.check(TEMPLATE_KEY.is_match(key), "key", || {
            format!("テンプレートキー '{key}' は英数字で始まり、英数字・'_'・'-' のみ使用できます")
        });
    }

    fn count(&mut self, count: i64) {
        self.check((MIN_COUNT..=MAX_COUNT).contains(&count), "count", || {
            format!("count は {MIN_COUNT}〜{MAX_COUNT} の範囲で指定してください（指定値: {count}）")
        });
    }

    fn one_of(&mut self, field: &str, value: &str, allowed: &[&str]) {
        self.check(allowed.contains(&value), field, || {
            format!("'{value}' は無効です（有効な値: {}）", allowed.join(", "))
        });
    }

    fn zone(&mut self, zone: Option<&str>) {
        if let Some(zone) = zone {
            self.check(ZONE.is_match(zone), "zone", || {
                format!("ゾーン '{zone}' の形式が不正です（例: fr-par-1）")
            });
        }
    }

    fn block_name(&mut self, name: Option<&str>) {
        if let Some(name) = name {
            self.check(BLOCK_NAME.is_match(name), "name", || {
                format!("名前 '{name}' は英数字で始まる63文字以内で、英数字・'_'・'.'・'-' のみ使用できます")
            });
        }
    }

    /// 展開後の名前（最大インデックス時）が長さ上限に収まるか
    fn derived_block_name<T: Template>(&mut self, template: &T) {
        let Ok(count) = u32::try_from(template.count()) else {
            return;
        };
        let explicit_invalid = template
            .base_name()
            .is_some_and(|base| !BLOCK_NAME.is_match(base));
        if !(MIN_COUNT..=MAX_COUNT).contains(&i64::from(count)) || explicit_invalid {
            return;
        }
        let longest = resolved_name(self.key, template, count);
        self.check(longest.len() <= MAX_BLOCK_NAME_LEN, "name", || {
            format!(
                "展開後の名前 '{longest}' が {} 文字になり、上限 {MAX_BLOCK_NAME_LEN} 文字を超えます",
                longest.len()
            )
        });
    }

    fn qcow_locator(&mut self, field: &str, locator: &ObjectLocator) {
        self.check(!locator.bucket.is_empty(), field, || {
            "bucket を指定してください".to_string()
        });
        match recognized_suffix(&locator.key) {
            Some(suffix) if locator.key.len() > suffix.len() => {}
            Some(_) => self.push(field, "キーに拡張子以外の部分がありません"),
            None => self.push(
                field,
                format!(
                    "キー '{}' は .qcow2 または .qcow で終わる必要があります",
                    locator.key
                ),
            ),
        }
    }
}

/// テンプレート集合を検査する
///
/// 問題が1件もなければ [`ValidatedTemplates`] を返す。
pub fn validate(templates: &TemplateSet) -> Result<ValidatedTemplates<'_>, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    validate_settings(&templates.settings, &mut issues);

    for (key, bucket) in &templates.buckets {
        validate_bucket(key, bucket, &mut issues);
    }
    for (key, volume) in &templates.volumes {
        validate_volume(key, volume, &mut issues);
    }
    for (key, snapshot) in &templates.snapshots {
        validate_snapshot(key, snapshot, &mut issues);
    }
    for (key, object) in &templates.objects {
        validate_object(key, object, &mut issues);
    }
    for (key, policy) in &templates.policies {
        validate_policy(key, policy, &mut issues);
    }
    for (key, lock) in &templates.locks {
        validate_lock(key, lock, &mut issues);
    }

    if issues.is_empty() {
        debug!(templates = templates.len(), "Validation passed");
        Ok(ValidatedTemplates(templates))
    } else {
        debug!(issues = issues.len(), "Validation failed");
        Err(issues)
    }
}

fn validate_settings(settings: &Settings, out: &mut Vec<ValidationIssue>) {
    if let Some(region) = settings.region.as_deref()
        && !REGIONS.contains(&region)
    {
        out.push(ValidationIssue::settings(
            "region",
            format!("'{region}' は無効です（有効な値: {}）", REGIONS.join(", ")),
        ));
    }

    if let Some(zone) = settings.zone.as_deref()
        && !ZONE.is_match(zone)
    {
        out.push(ValidationIssue::settings(
            "zone",
            format!("ゾーン '{zone}' の形式が不正です（例: fr-par-1）"),
        ));
    }

    match (&settings.project_id, &settings.project_name) {
        (Some(_), Some(_)) => out.push(ValidationIssue::settings(
            "project",
            "project-id と project は同時に指定できません",
        )),
        (None, Some(_)) if settings.organization_id.is_none() => {
            out.push(ValidationIssue::settings(
                "organization-id",
                "project を名前で指定する場合は organization-id が必要です",
            ))
        }
        _ => {}
    }
}

fn validate_bucket(key: &str, bucket: &BucketTemplate, out: &mut Vec<ValidationIssue>) {
    let mut issues = Issues {
        class: ResourceClass::Bucket,
        key,
        out,
    };

    issues.key();
    issues.count(bucket.count);

    let name = bucket.name.as_str();
    if !BUCKET_NAME.is_match(name) {
        issues.push(
            "name",
            format!("バケット名 '{name}' は小文字英数字で始まり終わる3〜63文字で、'.' と '-' のみ使用できます"),
        );
    } else if bucket.count > 1 && bucket.count <= MAX_COUNT {
        let longest = name.len() + 1 + bucket.count.to_string().len();
        issues.check(longest <= MAX_BUCKET_NAME_LEN, "name", || {
            format!(
                "count {} で展開すると名前が {longest} 文字になり、上限 {MAX_BUCKET_NAME_LEN} 文字を超えます",
                bucket.count
            )
        });
    }

    if let Some(region) = bucket.region.as_deref() {
        issues.one_of("region", region, REGIONS);
    }
    issues.one_of("acl", &bucket.acl, BUCKET_ACLS);

    issues.check(!bucket.object_lock || bucket.versioning, "object-lock", || {
        "object-lock を有効にするには versioning も有効にしてください".to_string()
    });

    let mut seen = BTreeSet::new();
    for rule in &bucket.lifecycle_rules {
        validate_lifecycle(&mut issues, rule);
        if !rule.id.is_empty() && !seen.insert(rule.id.as_str()) {
            issues.push(
                "lifecycle",
                format!("ライフサイクルルール '{}' が重複しています", rule.id),
            );
        }
    }

    for rule in &bucket.cors_rules {
        validate_cors(&mut issues, rule);
    }
}

fn validate_lifecycle(issues: &mut Issues<'_>, rule: &LifecycleRule) {
    if rule.id.is_empty() {
        issues.push("lifecycle", "ライフサイクルルールには id を指定してください");
    }

    let days = rule
        .expiration_days
        .into_iter()
        .chain(rule.abort_incomplete_upload_days)
        .chain(rule.transitions.iter().map(|t| t.days));
    for day in days {
        issues.check(day >= 1, "lifecycle", || {
            format!("ルール '{}': 日数は1以上を指定してください（指定値: {day}）", rule.id)
        });
    }

    for transition in &rule.transitions {
        issues.one_of(
            "lifecycle.storage-class",
            &transition.storage_class,
            STORAGE_CLASSES,
        );
    }
}

fn validate_cors(issues: &mut Issues<'_>, rule: &CorsRule) {
    issues.check(!rule.allowed_origins.is_empty(), "cors", || {
        "allowed-origins を1つ以上指定してください".to_string()
    });
    issues.check(!rule.allowed_methods.is_empty(), "cors", || {
        "allowed-methods を1つ以上指定してください".to_string()
    });
    for method in &rule.allowed_methods {
        issues.one_of("cors.allowed-methods", method, CORS_METHODS);
    }
    if let Some(max_age) = rule.max_age_seconds {
        issues.check(max_age >= 0, "cors.max-age-seconds", || {
            format!("max-age-seconds は0以上を指定してください（指定値: {max_age}）")
        });
    }
}

fn validate_volume(key: &str, volume: &VolumeTemplate, out: &mut Vec<ValidationIssue>) {
    let mut issues = Issues {
        class: ResourceClass::Volume,
        key,
        out,
    };

    issues.key();
    issues.count(volume.count);
    issues.block_name(volume.name.as_deref());
    issues.derived_block_name(volume);
    issues.zone(volume.zone.as_deref());

    let size = volume.size_gb;
    issues.check(
        (MIN_VOLUME_SIZE_GB..=MAX_VOLUME_SIZE_GB).contains(&size),
        "size",
        || {
            format!(
                "サイズは {MIN_VOLUME_SIZE_GB}〜{MAX_VOLUME_SIZE_GB} GB の範囲で指定してください（指定値: {size}）"
            )
        },
    );

    let iops = volume.iops;
    issues.check(IOPS_TIERS.contains(&iops), "iops", || {
        let tiers: Vec<String> = IOPS_TIERS.iter().map(|t| t.to_string()).collect();
        format!("IOPS {iops} は無効です（有効な値: {}）", tiers.join(", "))
    });

    if let Some(id) = volume.snapshot_id.as_deref() {
        issues.check(!id.is_empty(), "snapshot-id", || {
            "snapshot-id が空です".to_string()
        });
    }
}

fn validate_snapshot(key: &str, snapshot: &SnapshotTemplate, out: &mut Vec<ValidationIssue>) {
    let mut issues = Issues {
        class: ResourceClass::Snapshot,
        key,
        out,
    };

    issues.key();
    issues.count(snapshot.count);
    issues.block_name(snapshot.name.as_deref());
    issues.derived_block_name(snapshot);
    issues.zone(snapshot.zone.as_deref());

    match (&snapshot.volume, &snapshot.import) {
        (Some(_), Some(_)) => issues.push("source", "volume と import は同時に指定できません"),
        (None, None) => issues.push("source", "volume または import のどちらかを指定してください"),
        (Some(volume), None) => issues.check(!volume.key().is_empty(), "volume", || {
            "volume が空です".to_string()
        }),
        (None, Some(import)) => issues.qcow_locator("import", import),
    }

    if let Some(export) = &snapshot.export {
        issues.qcow_locator("export", export);
    }
}

fn validate_object(key: &str, object: &ObjectTemplate, out: &mut Vec<ValidationIssue>) {
    let mut issues = Issues {
        class: ResourceClass::Object,
        key,
        out,
    };

    issues.key();
    issues.check(!object.bucket.key().is_empty(), "bucket", || {
        "bucket を指定してください".to_string()
    });

    if object.key.is_empty() {
        issues.push("key", "オブジェクトキーが空です");
    } else if object.key.starts_with('/') {
        issues.push(
            "key",
            format!("オブジェクトキー '{}' は '/' で始めることはできません", object.key),
        );
    }

    match (&object.file, &object.content) {
        (Some(_), Some(_)) => issues.push("body", "file と content は同時に指定できません"),
        (None, None) => issues.push("body", "file または content のどちらかを指定してください"),
        _ => {}
    }

    issues.one_of("visibility", &object.visibility, VISIBILITIES);
}

fn validate_policy(key: &str, policy: &PolicyTemplate, out: &mut Vec<ValidationIssue>) {
    let mut issues = Issues {
        class: ResourceClass::Policy,
        key,
        out,
    };

    issues.key();
    issues.check(!policy.bucket.key().is_empty(), "bucket", || {
        "bucket を指定してください".to_string()
    });

    if let Err(e) = serde_json::from_str::<serde_json::Value>(&policy.document) {
        issues.push("document", format!("ポリシードキュメントが JSON として不正です: {e}"));
    }
}

fn validate_lock(key: &str, lock: &LockTemplate, out: &mut Vec<ValidationIssue>) {
    let mut issues = Issues {
        class: ResourceClass::Lock,
        key,
        out,
    };

    issues.key();
    issues.check(!lock.bucket.key().is_empty(), "bucket", || {
        "bucket を指定してください".to_string()
    });
    issues.one_of("mode", &lock.mode, LOCK_MODES);

    match (lock.days, lock.years) {
        (Some(_), Some(_)) => issues.push("retention", "days と years は同時に指定できません"),
        (None, None) => issues.push("retention", "days または years のどちらかを指定してください"),
        (Some(days), None) => issues.check((1..=MAX_RETENTION_DAYS).contains(&days), "days", || {
            format!("days は 1〜{MAX_RETENTION_DAYS} の範囲で指定してください（指定値: {days}）")
        }),
        (None, Some(years)) => {
            issues.check((1..=MAX_RETENTION_YEARS).contains(&years), "years", || {
                format!("years は 1〜{MAX_RETENTION_YEARS} の範囲で指定してください（指定値: {years}）")
            })
        }
    }
}
