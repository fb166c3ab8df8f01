//! テンプレート展開
//!
//! テンプレートマップを展開済みマップに変換する純粋関数群。
//! 展開キーは常に `"{templateKey}-{index}"`（count == 1 でも `-1` が付く）。
//! 一方、リソース名は count == 1 のとき接尾辞を付けない（単一インスタンス構成との互換性）。

use crate::export_path;
use crate::model::kind::{Bucket, Snapshot, Volume};
use crate::model::{
    BucketInstance, ExpandedKey, ExpandedMap, Instance, Settings, SnapshotDraft, SnapshotTemplate,
    Template, VolumeInstance,
};
use crate::validation::ValidatedTemplates;
use std::collections::BTreeMap;
use tracing::debug;

/// 展開結果（参照解決前）
#[derive(Debug, Clone)]
pub struct Expansion {
    pub buckets: ExpandedMap<Bucket, BucketInstance>,
    pub volumes: ExpandedMap<Volume, VolumeInstance>,
    pub snapshots: ExpandedMap<Snapshot, SnapshotDraft>,
}

impl Expansion {
    pub fn instance_count(&self) -> usize {
        self.buckets.len() + self.volumes.len() + self.snapshots.len()
    }
}

/// バリデーション済みテンプレートを展開
pub fn expand(validated: &ValidatedTemplates<'_>) -> Expansion {
    let templates = validated.templates();
    let settings = &templates.settings;

    let expansion = Expansion {
        buckets: expand_templates(&templates.buckets, settings),
        volumes: expand_templates(&templates.volumes, settings),
        snapshots: expand_snapshots(&templates.snapshots, settings),
    };

    debug!(
        buckets = expansion.buckets.len(),
        volumes = expansion.volumes.len(),
        snapshots = expansion.snapshots.len(),
        "Expanded templates"
    );

    expansion
}

/// 1クラス分のテンプレートを展開（テンプレートキー順の畳み込み）
pub fn expand_templates<T: Template>(
    templates: &BTreeMap<String, T>,
    settings: &Settings,
) -> ExpandedMap<T::Kind, Instance<T>> {
    templates
        .iter()
        .fold(ExpandedMap::new(), |mut map, (template_key, template)| {
            for instance in instances_of(template_key, template, settings) {
                map.insert(template_key, instance.key.clone(), instance);
            }
            map
        })
}

/// スナップショットを展開し、作成元とエクスポート先をインスタンスごとに確定する
fn expand_snapshots(
    templates: &BTreeMap<String, SnapshotTemplate>,
    settings: &Settings,
) -> ExpandedMap<Snapshot, SnapshotDraft> {
    let mut map = ExpandedMap::new();

    for (template_key, template) in templates {
        // 作成元が一意に決まらないテンプレートはバリデーションで拒否済み
        let Some(source) = template.source() else {
            continue;
        };
        let count = instance_count(template.count);

        for instance in instances_of(template_key, template, settings) {
            let export = template
                .export
                .as_ref()
                .map(|e| export_path::locator_for(e, instance.index, count));
            map.insert(
                template_key,
                instance.key.clone(),
                SnapshotDraft {
                    instance,
                    source: source.clone(),
                    export,
                },
            );
        }
    }

    map
}

/// 1テンプレート分のインスタンスを生成
pub fn instances_of<'a, T: Template>(
    template_key: &'a str,
    template: &'a T,
    settings: &'a Settings,
) -> impl Iterator<Item = Instance<T>> + 'a {
    let count = instance_count(template.count());
    (1..=count).map(move |index| Instance {
        key: ExpandedKey::new(template_key, index),
        template_key: template_key.to_string(),
        index,
        name: resolved_name(template_key, template, index),
        location: template.location(settings).to_string(),
        tags: settings.merged_tags(template.tags()),
        spec: template.clone(),
    })
}

/// インスタンス名を導出
///
/// ```text
/// baseName あり: count > 1 ? "{baseName}-{i}"     : baseName
/// baseName なし: count > 1 ? "{key}-{i}-{suffix}" : "{key}-{suffix}"
/// ```
pub fn resolved_name<T: Template>(template_key: &str, template: &T, index: u32) -> String {
    let multi = template.count() > 1;
    match (template.base_name(), T::NAME_SUFFIX) {
        (Some(base), _) if multi => format!("{base}-{index}"),
        (Some(base), _) => base.to_string(),
        (None, Some(suffix)) if multi => format!("{template_key}-{index}-{suffix}"),
        (None, Some(suffix)) => format!("{template_key}-{suffix}"),
        (None, None) if multi => format!("{template_key}-{index}"),
        (None, None) => template_key.to_string(),
    }
}

/// count を展開数に変換（範囲外はバリデーションで拒否済みなので0件扱い）
fn instance_count(count: i64) -> u32 {
    u32::try_from(count).unwrap_or(0)
}
