//! エクスポート先パスの重複排除
//!
//! 1つのスナップショットテンプレートから複数インスタンスが展開されると、
//! 全インスタンスが同じエクスポート先に書き込もうとして衝突する。
//! count > 1 のときは認識済み拡張子の直前に `-{index}` を挿入して区別する。

use crate::model::{ObjectLocator, SNAPSHOT_IMAGE_SUFFIXES};

/// パス末尾の認識済み拡張子を返す
pub fn recognized_suffix(path: &str) -> Option<&'static str> {
    SNAPSHOT_IMAGE_SUFFIXES
        .iter()
        .copied()
        .find(|suffix| path.ends_with(suffix))
}

/// インスタンス `index`（1始まり）用のパスを返す
///
/// - `count == 1`: そのまま
/// - `count > 1`: `db.qcow2` → `db-{index}.qcow2`
///
/// 拡張子はバリデーション済みの前提だが、無い場合は末尾に付与する。
pub fn dedup_path(path: &str, index: u32, count: u32) -> String {
    if count <= 1 {
        return path.to_string();
    }

    match recognized_suffix(path) {
        Some(suffix) => {
            let stem = &path[..path.len() - suffix.len()];
            format!("{stem}-{index}{suffix}")
        }
        None => format!("{path}-{index}"),
    }
}

/// エクスポート指定をインスタンス用に変換（バケットはそのまま）
pub fn locator_for(export: &ObjectLocator, index: u32, count: u32) -> ObjectLocator {
    ObjectLocator {
        bucket: export.bucket.clone(),
        key: dedup_path(&export.key, index, count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_single_instance_verbatim() {
        assert_eq!(dedup_path("db.qcow2", 1, 1), "db.qcow2");
        assert_eq!(dedup_path("backups/nightly.qcow", 1, 1), "backups/nightly.qcow");
    }

    #[test]
    fn test_multi_instance_inserts_index_before_suffix() {
        let paths: Vec<String> = (1..=3).map(|i| dedup_path("db.qcow2", i, 3)).collect();
        assert_eq!(paths, vec!["db-1.qcow2", "db-2.qcow2", "db-3.qcow2"]);
    }

    #[test]
    fn test_qcow_suffix() {
        assert_eq!(dedup_path("images/base.qcow", 2, 2), "images/base-2.qcow");
    }

    #[test]
    fn test_suffix_preserved_and_distinct() {
        let count = 12;
        let paths: HashSet<String> = (1..=count)
            .map(|i| dedup_path("exports/vol.data.qcow2", i, count))
            .collect();

        assert_eq!(paths.len(), count as usize);
        for path in &paths {
            assert!(path.ends_with(".qcow2"));
            assert!(path.starts_with("exports/vol.data-"));
        }
        assert!(paths.contains("exports/vol.data-12.qcow2"));
    }

    #[test]
    fn test_unrecognized_suffix_appends() {
        assert_eq!(dedup_path("raw-image", 2, 3), "raw-image-2");
    }

    #[test]
    fn test_locator_keeps_bucket() {
        let export = ObjectLocator::new("acme-backups", "db.qcow2");
        let locator = locator_for(&export, 2, 3);
        assert_eq!(locator.bucket, "acme-backups");
        assert_eq!(locator.key, "db-2.qcow2");
    }
}
