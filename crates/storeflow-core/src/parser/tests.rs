use super::*;
use crate::model::{ObjectBody, ObjectLocator, SnapshotSource};
use std::path::PathBuf;

#[test]
fn test_parse_settings() {
    let kdl = r#"
        settings {
            region "nl-ams"
            zone "nl-ams-2"
            project "storage"
            organization-id "org-123"
            tags {
                env "prod"
                team "storage"
            }
        }
    "#;

    let set = parse_kdl_string(kdl).unwrap();
    let settings = &set.settings;

    assert_eq!(settings.region(), "nl-ams");
    assert_eq!(settings.zone(), "nl-ams-2");
    assert_eq!(settings.project_name, Some("storage".to_string()));
    assert_eq!(settings.organization_id, Some("org-123".to_string()));
    assert_eq!(settings.tags.len(), 2);
    assert_eq!(settings.tags["env"], "prod");
    assert!(set.is_empty());
}

#[test]
fn test_parse_bucket() {
    let kdl = r#"
        bucket "logs" {
            name "acme-logs"
            count 2
            region "pl-waw"
            acl "authenticated-read"
            versioning
            object-lock #true
            force-destroy #false
            tags {
                retention "long"
            }
        }
    "#;

    let set = parse_kdl_string(kdl).unwrap();
    assert_eq!(set.buckets.len(), 1);

    let bucket = &set.buckets["logs"];
    assert_eq!(bucket.name, "acme-logs");
    assert_eq!(bucket.count, 2);
    assert_eq!(bucket.region, Some("pl-waw".to_string()));
    assert_eq!(bucket.acl, "authenticated-read");
    assert!(bucket.versioning);
    assert!(bucket.object_lock);
    assert!(!bucket.force_destroy);
    assert_eq!(bucket.tags["retention"], "long");
}

#[test]
fn test_parse_bucket_defaults() {
    let kdl = r#"
        bucket "assets" {
            name "acme-assets"
        }
    "#;

    let set = parse_kdl_string(kdl).unwrap();
    let bucket = &set.buckets["assets"];

    assert_eq!(bucket.count, 1);
    assert_eq!(bucket.acl, "private");
    assert_eq!(bucket.region, None);
    assert!(!bucket.versioning);
    assert!(bucket.lifecycle_rules.is_empty());
}

#[test]
fn test_parse_bucket_lifecycle_and_cors() {
    let kdl = r#"
        bucket "logs" {
            name "acme-logs"
            lifecycle "archive" {
                prefix "logs/"
                transition days=30 storage-class="ONEZONE_IA"
                transition days=90 storage-class="GLACIER"
                expiration-days 365
                abort-incomplete-upload-days 7
            }
            lifecycle "tmp" {
                enabled #false
                expiration-days 1
            }
            cors {
                allowed-origins "https://acme.example" "https://www.acme.example"
                allowed-methods "GET" "HEAD"
                allowed-headers "*"
                max-age-seconds 3600
            }
        }
    "#;

    let set = parse_kdl_string(kdl).unwrap();
    let bucket = &set.buckets["logs"];

    assert_eq!(bucket.lifecycle_rules.len(), 2);
    let archive = &bucket.lifecycle_rules[0];
    assert_eq!(archive.id, "archive");
    assert_eq!(archive.prefix, Some("logs/".to_string()));
    assert!(archive.enabled);
    assert_eq!(archive.expiration_days, Some(365));
    assert_eq!(archive.abort_incomplete_upload_days, Some(7));
    assert_eq!(archive.transitions.len(), 2);
    assert_eq!(archive.transitions[1].days, 90);
    assert_eq!(archive.transitions[1].storage_class, "GLACIER");
    assert!(!bucket.lifecycle_rules[1].enabled);

    assert_eq!(bucket.cors_rules.len(), 1);
    let cors = &bucket.cors_rules[0];
    assert_eq!(cors.allowed_origins.len(), 2);
    assert_eq!(cors.allowed_methods, vec!["GET", "HEAD"]);
    assert_eq!(cors.allowed_headers, vec!["*"]);
    assert_eq!(cors.max_age_seconds, Some(3600));
}

#[test]
fn test_parse_bucket_without_name_error() {
    let kdl = r#"
        bucket "assets" {
            acl "private"
        }
    "#;

    let result = parse_kdl_string(kdl);
    assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
}

#[test]
fn test_parse_volumes() {
    let kdl = r#"
        volume "app" {
            count 3
            size 50
            iops 5000
        }

        volume "database" {
            name "pg-data"
            size 200
            iops 15000
            zone "fr-par-2"
            snapshot-id "11111111-2222-3333-4444-555555555555"
        }
    "#;

    let set = parse_kdl_string(kdl).unwrap();
    assert_eq!(set.volumes.len(), 2);

    let app = &set.volumes["app"];
    assert_eq!(app.count, 3);
    assert_eq!(app.size_gb, 50);
    assert_eq!(app.name, None);

    let database = &set.volumes["database"];
    assert_eq!(database.name, Some("pg-data".to_string()));
    assert_eq!(database.iops, 15000);
    assert_eq!(database.zone, Some("fr-par-2".to_string()));
    assert!(database.snapshot_id.is_some());
}

#[test]
fn test_parse_volume_without_size_error() {
    let kdl = r#"
        volume "app" {
            iops 5000
        }
    "#;

    assert!(parse_kdl_string(kdl).is_err());
}

#[test]
fn test_parse_snapshots() {
    let kdl = r#"
        snapshot "backup" {
            count 3
            volume "database-1"
            export bucket="acme-backups" key="db.qcow2"
        }

        snapshot "golden" {
            import bucket="acme-images" key="base.qcow"
        }
    "#;

    let set = parse_kdl_string(kdl).unwrap();
    assert_eq!(set.snapshots.len(), 2);

    let backup = &set.snapshots["backup"];
    assert_eq!(backup.count, 3);
    assert_eq!(
        backup.export,
        Some(ObjectLocator::new("acme-backups", "db.qcow2"))
    );
    match backup.source() {
        Some(SnapshotSource::Volume { volume }) => assert_eq!(volume.key(), "database-1"),
        other => panic!("unexpected source: {other:?}"),
    }

    let golden = &set.snapshots["golden"];
    assert_eq!(golden.count, 1);
    assert_eq!(
        golden.source(),
        Some(SnapshotSource::Import {
            locator: ObjectLocator::new("acme-images", "base.qcow"),
        })
    );
}

#[test]
fn test_parse_snapshot_keeps_conflicting_sources() {
    // 排他チェックはバリデーション層の責務
    let kdl = r#"
        snapshot "both" {
            volume "database-1"
            import bucket="acme-images" key="base.qcow2"
        }
    "#;

    let set = parse_kdl_string(kdl).unwrap();
    let both = &set.snapshots["both"];
    assert!(both.volume.is_some());
    assert!(both.import.is_some());
    assert_eq!(both.source(), None);
}

#[test]
fn test_parse_export_without_key_error() {
    let kdl = r#"
        snapshot "backup" {
            volume "database-1"
            export bucket="acme-backups"
        }
    "#;

    assert!(parse_kdl_string(kdl).is_err());
}

#[test]
fn test_parse_attachments() {
    let kdl = r##"
        object "index" {
            bucket "assets-1"
            key "index.html"
            content "<h1>hello</h1>"
            content-type "text/html"
            visibility "public-read"
        }

        object "logo" {
            bucket "assets-1"
            key "img/logo.png"
            file "./static/logo.png"
        }

        policy "public-read" {
            bucket "assets-1"
            document #"{"Version":"2023-04-17","Statement":[]}"#
        }

        lock "retain" {
            bucket "vault-1"
            mode "COMPLIANCE"
            years 7
        }
    "##;

    let set = parse_kdl_string(kdl).unwrap();
    assert_eq!(set.len(), 4);

    let index = &set.objects["index"];
    assert_eq!(index.bucket.key(), "assets-1");
    assert_eq!(index.key, "index.html");
    assert_eq!(index.content_type, Some("text/html".to_string()));
    assert_eq!(index.visibility, "public-read");
    assert_eq!(
        index.body(),
        Some(ObjectBody::Content {
            content: "<h1>hello</h1>".to_string()
        })
    );

    let logo = &set.objects["logo"];
    assert_eq!(logo.visibility, "private");
    assert_eq!(logo.file, Some(PathBuf::from("./static/logo.png")));

    let policy = &set.policies["public-read"];
    assert_eq!(policy.bucket.key(), "assets-1");
    assert!(policy.document.contains("\"Statement\""));

    let lock = &set.locks["retain"];
    assert_eq!(lock.mode, "COMPLIANCE");
    assert_eq!(lock.years, Some(7));
    assert_eq!(lock.days, None);
}

#[test]
fn test_parse_lock_default_mode() {
    let kdl = r#"
        lock "retain" {
            bucket "vault-1"
            days 30
        }
    "#;

    let set = parse_kdl_string(kdl).unwrap();
    assert_eq!(set.locks["retain"].mode, "GOVERNANCE");
}

#[test]
fn test_parse_object_without_bucket_error() {
    let kdl = r#"
        object "index" {
            key "index.html"
            content "hi"
        }
    "#;

    assert!(parse_kdl_string(kdl).is_err());
}

#[test]
fn test_duplicate_template_error() {
    let kdl = r#"
        volume "app" {
            size 20
        }
        volume "app" {
            size 30
        }
    "#;

    let result = parse_kdl_string(kdl);
    match result {
        Err(StoreError::DuplicateTemplate { class, key }) => {
            assert_eq!(class, "volume");
            assert_eq!(key, "app");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_duplicate_settings_error() {
    let kdl = r#"
        settings {
            region "fr-par"
        }
        settings {
            region "nl-ams"
        }
    "#;

    let result = parse_kdl_string(kdl);
    assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
}

#[test]
fn test_tag_value_must_be_string() {
    let cases = [
        ("version 2", "version"),
        ("public #true", "public"),
        ("env", "env"),
    ];

    for (tag, key) in cases {
        let kdl = format!(
            r#"
            volume "app" {{
                size 20
                tags {{
                    {tag}
                }}
            }}
            "#
        );
        let err = parse_kdl_string(&kdl).unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfig(_)), "{tag}: {err}");
        assert!(err.to_string().contains(key), "{tag}: {err}");
    }
}

#[test]
fn test_settings_tag_value_must_be_string() {
    let kdl = r#"
        settings {
            tags {
                tier 1
            }
        }
    "#;

    let result = parse_kdl_string(kdl);
    assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
}

#[test]
fn test_same_key_in_different_classes() {
    let kdl = r#"
        bucket "data" {
            name "acme-data"
        }
        volume "data" {
            size 20
        }
    "#;

    let set = parse_kdl_string(kdl).unwrap();
    assert_eq!(set.buckets.len(), 1);
    assert_eq!(set.volumes.len(), 1);
}

#[test]
fn test_unknown_field_error() {
    let kdl = r#"
        volume "app" {
            size 20
            throughput 100
        }
    "#;

    let err = parse_kdl_string(kdl).unwrap_err();
    assert!(err.to_string().contains("throughput"));
}

#[test]
fn test_unknown_top_level_node_is_skipped() {
    let kdl = r#"
        network "private" {
            cidr "10.0.0.0/24"
        }
        volume "app" {
            size 20
        }
    "#;

    let set = parse_kdl_string(kdl).unwrap();
    assert_eq!(set.len(), 1);
}

#[test]
fn test_missing_template_key_error() {
    let kdl = r#"
        volume {
            size 20
        }
    "#;

    assert!(parse_kdl_string(kdl).is_err());
}

#[test]
fn test_invalid_kdl_syntax() {
    let kdl = r#"
        volume "app" {
            size 20
    "#;

    let result = parse_kdl_string(kdl);
    assert!(matches!(result, Err(StoreError::KdlParse(_))));
}

#[test]
fn test_parse_kdl_file_missing() {
    let result = parse_kdl_file("/nonexistent/storage.kdl");
    assert!(matches!(result, Err(StoreError::IoError { .. })));
}
