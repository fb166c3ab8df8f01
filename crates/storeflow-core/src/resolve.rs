//! 参照解決
//!
//! スナップショット → ボリューム、オブジェクト/ポリシー/ロック → バケットの参照を
//! 展開済みマップに対して解決する。照合は展開キーとの完全一致のみ。
//!
//! テンプレートキー（例: `database`）を指定した参照は決して成功しないが、
//! 診断をわかりやすくするため、展開数に応じて `AmbiguousReference`
//! または候補付きの `DanglingReference` を返す。

use crate::expand::Expansion;
use crate::model::kind::{Bucket, Snapshot};
use crate::model::{
    BucketInstance, ExpandedKey, ExpandedMap, Instance, LockAttachment, ObjectLocator,
    ObjectPlacement, PolicyAttachment, Provenance, Ref, ResolvedRef, ResourceAddress,
    ResourceClass, ResourceKind, SnapshotDraft, SnapshotInstance, SnapshotSource, StoragePlan,
};
use crate::validation::ValidatedTemplates;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// 参照解決で検出されたエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("{referrer}.{field}: {class} '{missing}' が見つかりません{}", hint_suffix(.hint))]
    DanglingReference {
        referrer: ResourceAddress,
        field: &'static str,
        class: ResourceClass,
        missing: String,
        /// 指定値がテンプレートキーだった場合の正しい展開キー
        hint: Option<ExpandedKey>,
    },

    #[error(
        "{referrer}.{field}: '{template_key}' は {class} テンプレートのキーで、{}個に展開されています。展開キーを指定してください（候補: {}）",
        .candidates.len(),
        join_keys(.candidates)
    )]
    AmbiguousReference {
        referrer: ResourceAddress,
        field: &'static str,
        class: ResourceClass,
        template_key: String,
        candidates: Vec<ExpandedKey>,
    },

    #[error("bucket.{bucket}: {attachment} が複数設定されています（{first}, {second}）")]
    ConflictingAttachment {
        bucket: ExpandedKey,
        attachment: String,
        first: ResourceAddress,
        second: ResourceAddress,
    },

    #[error("{lock}: bucket '{bucket}' は object-lock が有効になっていません")]
    LockNotEnabled {
        lock: ResourceAddress,
        bucket: ExpandedKey,
    },

    #[error("バケット名 '{name}' が重複しています（bucket.{first}, bucket.{second}）")]
    NameCollision {
        name: String,
        first: ExpandedKey,
        second: ExpandedKey,
    },

    #[error(
        "エクスポート先 '{}/{}' が重複しています（snapshot.{first}, snapshot.{second}）",
        .locator.bucket,
        .locator.key
    )]
    ExportCollision {
        locator: ObjectLocator,
        first: ExpandedKey,
        second: ExpandedKey,
    },
}

fn hint_suffix(hint: &Option<ExpandedKey>) -> String {
    match hint {
        Some(key) => format!("（'{key}' のことですか？）"),
        None => String::new(),
    }
}

fn join_keys(keys: &[ExpandedKey]) -> String {
    keys.iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// 1つの参照を展開済みマップに対して解決する
pub fn resolve<K: ResourceKind, T>(
    referrer: &ResourceAddress,
    field: &'static str,
    reference: &Ref<K>,
    targets: &ExpandedMap<K, Instance<T>>,
) -> Result<ResolvedRef<K>, ResolveError> {
    if let Some(target) = targets.get(reference.key()) {
        return Ok(ResolvedRef::new(target.key.clone(), target.name.clone()));
    }

    match targets.keys_of_template(reference.key()) {
        Some(candidates) if candidates.len() > 1 => Err(ResolveError::AmbiguousReference {
            referrer: referrer.clone(),
            field,
            class: K::CLASS,
            template_key: reference.key().to_string(),
            candidates: candidates.to_vec(),
        }),
        candidates => Err(ResolveError::DanglingReference {
            referrer: referrer.clone(),
            field,
            class: K::CLASS,
            missing: reference.key().to_string(),
            hint: candidates.and_then(|c| c.first().cloned()),
        }),
    }
}

/// 展開結果の全参照を解決し、計画を組み立てる
///
/// エラーは全て収集して返す。1件でもあれば計画は返さない。
pub fn resolve_all(
    validated: &ValidatedTemplates<'_>,
    expansion: Expansion,
) -> Result<StoragePlan, Vec<ResolveError>> {
    let templates = validated.templates();
    let mut errors = Vec::new();

    check_bucket_names(&expansion.buckets, &mut errors);
    check_export_paths(&expansion.snapshots, &mut errors);

    // スナップショットの作成元はテンプレート単位で1回だけ解決する。
    // エラーはテンプレートの最初の展開キーに対して報告する
    let mut provenances: BTreeMap<&str, Option<Provenance>> = BTreeMap::new();
    for (key, draft) in expansion.snapshots.iter() {
        let template_key = draft.instance.template_key.as_str();
        if provenances.contains_key(template_key) {
            continue;
        }
        let referrer = ResourceAddress::new(ResourceClass::Snapshot, key.as_str());
        let provenance = match &draft.source {
            SnapshotSource::Volume { volume } => {
                match resolve(&referrer, "volume", volume, &expansion.volumes) {
                    Ok(volume) => Some(Provenance::Volume { volume }),
                    Err(e) => {
                        errors.push(e);
                        None
                    }
                }
            }
            SnapshotSource::Import { locator } => Some(Provenance::Import {
                locator: locator.clone(),
            }),
        };
        provenances.insert(template_key, provenance);
    }

    let mut snapshots = ExpandedMap::new();
    for (key, draft) in expansion.snapshots.iter() {
        let Some(Some(provenance)) = provenances.get(draft.instance.template_key.as_str()) else {
            continue;
        };
        snapshots.insert(
            &draft.instance.template_key,
            key.clone(),
            SnapshotInstance {
                instance: draft.instance.clone(),
                provenance: provenance.clone(),
                export: draft.export.clone(),
            },
        );
    }

    let mut objects = BTreeMap::new();
    let mut placed: BTreeMap<(ExpandedKey, &str), &str> = BTreeMap::new();
    for (key, object) in &templates.objects {
        let referrer = ResourceAddress::new(ResourceClass::Object, key.as_str());
        let bucket = match resolve(&referrer, "bucket", &object.bucket, &expansion.buckets) {
            Ok(bucket) => bucket,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };
        let Some(body) = object.body() else {
            continue;
        };

        let slot = (bucket.key.clone(), object.key.as_str());
        if let Some(first) = placed.insert(slot, key.as_str()) {
            errors.push(ResolveError::ConflictingAttachment {
                bucket: bucket.key.clone(),
                attachment: format!("object '{}'", object.key),
                first: ResourceAddress::new(ResourceClass::Object, first),
                second: referrer,
            });
            continue;
        }

        objects.insert(
            key.clone(),
            ObjectPlacement {
                key: object.key.clone(),
                bucket,
                body,
                tags: templates.settings.merged_tags(&object.tags),
                spec: object.clone(),
            },
        );
    }

    let mut policies = BTreeMap::new();
    let mut policy_owner: BTreeMap<ExpandedKey, &str> = BTreeMap::new();
    for (key, policy) in &templates.policies {
        let referrer = ResourceAddress::new(ResourceClass::Policy, key.as_str());
        let bucket = match resolve(&referrer, "bucket", &policy.bucket, &expansion.buckets) {
            Ok(bucket) => bucket,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };

        if let Some(first) = policy_owner.insert(bucket.key.clone(), key.as_str()) {
            errors.push(ResolveError::ConflictingAttachment {
                bucket: bucket.key.clone(),
                attachment: "policy".to_string(),
                first: ResourceAddress::new(ResourceClass::Policy, first),
                second: referrer,
            });
            continue;
        }

        policies.insert(
            key.clone(),
            PolicyAttachment {
                key: key.clone(),
                bucket,
                document: policy.document.clone(),
            },
        );
    }

    let mut locks = BTreeMap::new();
    let mut lock_owner: BTreeMap<ExpandedKey, &str> = BTreeMap::new();
    for (key, lock) in &templates.locks {
        let referrer = ResourceAddress::new(ResourceClass::Lock, key.as_str());
        let bucket = match resolve(&referrer, "bucket", &lock.bucket, &expansion.buckets) {
            Ok(bucket) => bucket,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };

        let lock_enabled = expansion
            .buckets
            .get(bucket.key.as_str())
            .is_some_and(|b| b.spec.object_lock);
        if !lock_enabled {
            errors.push(ResolveError::LockNotEnabled {
                lock: referrer,
                bucket: bucket.key.clone(),
            });
            continue;
        }

        if let Some(first) = lock_owner.insert(bucket.key.clone(), key.as_str()) {
            errors.push(ResolveError::ConflictingAttachment {
                bucket: bucket.key.clone(),
                attachment: "lock".to_string(),
                first: ResourceAddress::new(ResourceClass::Lock, first),
                second: referrer,
            });
            continue;
        }

        let Some(retention) = lock.retention() else {
            continue;
        };
        locks.insert(
            key.clone(),
            LockAttachment {
                key: key.clone(),
                bucket,
                mode: lock.mode.clone(),
                retention,
            },
        );
    }

    if !errors.is_empty() {
        debug!(errors = errors.len(), "Reference resolution failed");
        return Err(errors);
    }

    Ok(StoragePlan {
        settings: templates.settings.clone(),
        buckets: expansion.buckets,
        volumes: expansion.volumes,
        snapshots,
        objects,
        policies,
        locks,
    })
}

/// バケット名はグローバルな名前空間を共有するため、展開後の名前の重複を検出する
fn check_bucket_names(
    buckets: &ExpandedMap<Bucket, BucketInstance>,
    errors: &mut Vec<ResolveError>,
) {
    let mut seen: BTreeMap<&str, &ExpandedKey> = BTreeMap::new();
    for (key, bucket) in buckets.iter() {
        if let Some(first) = seen.insert(bucket.name.as_str(), key) {
            errors.push(ResolveError::NameCollision {
                name: bucket.name.clone(),
                first: first.clone(),
                second: key.clone(),
            });
        }
    }
}

/// 重複排除後のエクスポート先が複数のスナップショットで一致していないか検出する
fn check_export_paths(
    snapshots: &ExpandedMap<Snapshot, SnapshotDraft>,
    errors: &mut Vec<ResolveError>,
) {
    let mut seen: BTreeMap<&ObjectLocator, &ExpandedKey> = BTreeMap::new();
    for (key, draft) in snapshots.iter() {
        let Some(locator) = &draft.export else {
            continue;
        };
        if let Some(first) = seen.insert(locator, key) {
            errors.push(ResolveError::ExportCollision {
                locator: locator.clone(),
                first: first.clone(),
                second: key.clone(),
            });
        }
    }
}
