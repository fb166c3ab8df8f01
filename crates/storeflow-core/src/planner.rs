//! 計画パス
//!
//! バリデーション → 展開 → 参照解決 を1回で実行する。
//! どの段階で失敗しても部分的な計画は返さない。

use crate::error::PlanError;
use crate::expand::expand;
use crate::model::{StoragePlan, TemplateSet};
use crate::resolve::resolve_all;
use crate::validation::validate;
use tracing::{debug, info};

/// テンプレート集合から計画を生成
pub fn plan(templates: &TemplateSet) -> Result<StoragePlan, PlanError> {
    debug!(templates = templates.len(), "Planning");

    let validated = validate(templates).map_err(PlanError::Validation)?;
    let expansion = expand(&validated);
    let plan = resolve_all(&validated, expansion).map_err(PlanError::Resolution)?;

    info!(
        buckets = plan.buckets.len(),
        volumes = plan.volumes.len(),
        snapshots = plan.snapshots.len(),
        objects = plan.objects.len(),
        policies = plan.policies.len(),
        locks = plan.locks.len(),
        "Plan complete"
    );

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        BucketTemplate, ObjectLocator, ObjectTemplate, Provenance, SnapshotTemplate,
        VolumeTemplate,
    };
    use crate::parser::parse_kdl_string;

    #[test]
    fn test_app_volumes_count_three() {
        let mut set = TemplateSet::new();
        let mut app = VolumeTemplate::new(50).with_count(3);
        app.iops = 5000;
        set.volumes.insert("app".to_string(), app);

        let plan = plan(&set).unwrap();

        let volumes: Vec<(&str, &str)> = plan
            .volumes
            .iter()
            .map(|(key, v)| (key.as_str(), v.name.as_str()))
            .collect();
        assert_eq!(
            volumes,
            vec![
                ("app-1", "app-1-volume"),
                ("app-2", "app-2-volume"),
                ("app-3", "app-3-volume"),
            ]
        );
        for volume in plan.volumes.values() {
            assert_eq!(volume.spec.size_gb, 50);
            assert_eq!(volume.spec.iops, 5000);
            assert_eq!(volume.location, "fr-par-1");
        }
    }

    #[test]
    fn test_one_invalid_template_rejects_batch() {
        let mut set = TemplateSet::new();
        set.volumes
            .insert("app".to_string(), VolumeTemplate::new(50).with_count(3));
        set.volumes
            .insert("broken".to_string(), VolumeTemplate::new(50).with_count(0));
        set.buckets
            .insert("assets".to_string(), BucketTemplate::new("acme-assets"));

        let err = plan(&set).unwrap_err();
        match &err {
            PlanError::Validation(issues) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].subject, "volume.broken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.messages().len(), 1);
    }

    #[test]
    fn test_resolution_failure_returns_no_plan() {
        let mut set = TemplateSet::new();
        set.volumes
            .insert("database".to_string(), VolumeTemplate::new(50));
        set.snapshots.insert(
            "backup".to_string(),
            SnapshotTemplate::from_volume("database"),
        );

        let err = plan(&set).unwrap_err();
        assert!(matches!(err, PlanError::Resolution(ref errors) if errors.len() == 1));
    }

    #[test]
    fn test_plan_is_deterministic() {
        let mut set = TemplateSet::new();
        set.buckets.insert(
            "assets".to_string(),
            BucketTemplate::new("acme-assets").with_count(2),
        );
        set.volumes
            .insert("database".to_string(), VolumeTemplate::new(50));
        set.snapshots.insert(
            "backup".to_string(),
            SnapshotTemplate::from_volume("database-1")
                .with_count(2)
                .with_export(ObjectLocator::new("acme-assets-1", "db.qcow2")),
        );
        set.objects.insert(
            "index".to_string(),
            ObjectTemplate::new("assets-2", "index.html").with_content("ok"),
        );

        let first = plan(&set).unwrap();
        let second = plan(&set).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_plan_from_kdl() {
        let kdl = r##"
            settings {
                region "fr-par"
                zone "fr-par-2"
                project-id "7f1c2d3e-0000-4000-8000-000000000001"
                tags {
                    env "prod"
                }
            }

            bucket "assets" {
                name "acme-assets"
                versioning
            }

            bucket "vault" {
                name "acme-vault"
                versioning
                object-lock
            }

            volume "database" {
                size 100
                iops 15000
            }

            snapshot "backup" {
                count 3
                volume "database-1"
                export bucket="acme-vault" key="backups/db.qcow2"
            }

            object "index" {
                bucket "assets-1"
                key "index.html"
                content "<h1>acme</h1>"
                visibility "public-read"
            }

            policy "public" {
                bucket "assets-1"
                document #"{"Version":"2023-04-17","Statement":[]}"#
            }

            lock "retain" {
                bucket "vault-1"
                mode "COMPLIANCE"
                days 30
            }
        "##;

        let set = parse_kdl_string(kdl).unwrap();
        let plan = plan(&set).unwrap();

        assert_eq!(plan.resource_count(), 9);
        assert_eq!(plan.buckets.get("assets-1").unwrap().name, "acme-assets");
        assert_eq!(plan.buckets.get("assets-1").unwrap().location, "fr-par");

        let database = plan.volumes.get("database-1").unwrap();
        assert_eq!(database.name, "database-volume");
        assert_eq!(database.location, "fr-par-2");
        assert_eq!(database.tags["env"], "prod");

        let exports: Vec<&str> = plan
            .snapshots
            .values()
            .map(|s| s.export.as_ref().unwrap().key.as_str())
            .collect();
        assert_eq!(
            exports,
            vec![
                "backups/db-1.qcow2",
                "backups/db-2.qcow2",
                "backups/db-3.qcow2"
            ]
        );
        for snapshot in plan.snapshots.values() {
            assert!(matches!(
                &snapshot.provenance,
                Provenance::Volume { volume } if volume.key.as_str() == "database-1"
            ));
        }

        assert_eq!(plan.objects["index"].bucket.name, "acme-assets");
        assert_eq!(plan.locks["retain"].bucket.name, "acme-vault");
    }
}
