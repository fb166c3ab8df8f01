//! 統合ローダー
//!
//! ファイル読み込み、パース、計画パスを統合

use crate::error::{Result, StoreError};
use crate::model::{StoragePlan, TemplateSet};
use crate::parser::parse_kdl_file;
use crate::planner::plan;
use std::path::Path;
use tracing::{debug, info, instrument};

/// テンプレートファイルを読み込む
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_templates(path: &Path) -> Result<TemplateSet> {
    debug!("Parsing template file");
    let templates = parse_kdl_file(path)?;
    info!(
        buckets = templates.buckets.len(),
        volumes = templates.volumes.len(),
        snapshots = templates.snapshots.len(),
        objects = templates.objects.len(),
        policies = templates.policies.len(),
        locks = templates.locks.len(),
        "Templates loaded"
    );
    Ok(templates)
}

/// テンプレートファイルを読み込んで計画を生成
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_plan(path: &Path) -> Result<StoragePlan> {
    let templates = load_templates(path)?;
    plan(&templates).map_err(StoreError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanError;
    use std::fs;

    #[test]
    fn test_load_templates() -> Result<()> {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("storage.kdl");
        fs::write(
            &path,
            r#"
volume "app" {
    count 2
    size 20
}
"#,
        )?;

        let templates = load_templates(&path)?;
        assert_eq!(templates.volumes.len(), 1);
        assert_eq!(templates.volumes["app"].count, 2);

        Ok(())
    }

    #[test]
    fn test_load_plan() -> Result<()> {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("storage.kdl");
        fs::write(
            &path,
            r#"
bucket "assets" {
    name "acme-assets"
    count 2
}

object "index" {
    bucket "assets-2"
    key "index.html"
    content "hello"
}
"#,
        )?;

        let plan = load_plan(&path)?;
        assert_eq!(plan.buckets.len(), 2);
        assert_eq!(plan.objects["index"].bucket.name, "acme-assets-2");

        Ok(())
    }

    #[test]
    fn test_load_plan_surfaces_all_issues() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("storage.kdl");
        fs::write(
            &path,
            r#"
volume "app" {
    count 0
    size 1
}
"#,
        )
        .unwrap();

        match load_plan(&path) {
            Err(StoreError::Plan(PlanError::Validation(issues))) => assert_eq!(issues.len(), 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = load_templates(&temp_dir.path().join("missing.kdl"));
        assert!(matches!(result, Err(StoreError::IoError { .. })));
    }
}
