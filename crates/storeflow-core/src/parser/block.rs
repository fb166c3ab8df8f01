//! volume / snapshot ノードのパース

use super::{integer_arg, parse_tags, string_arg, string_prop, template_key, unknown_field};
use crate::error::{Result, StoreError};
use crate::model::{ObjectLocator, Ref, ResourceClass, SnapshotTemplate, VolumeTemplate};
use kdl::KdlNode;

/// volume ノードをパース
pub fn parse_volume(node: &KdlNode) -> Result<(String, VolumeTemplate)> {
    let key = template_key(node, ResourceClass::Volume)?;

    let mut size = None;
    let mut volume = VolumeTemplate::new(0);

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "name" => volume.name = Some(string_arg(child)?),
                "count" => volume.count = integer_arg(child)?,
                "size" | "size_gb" | "size-gb" => size = Some(integer_arg(child)?),
                "iops" => volume.iops = integer_arg(child)?,
                "zone" => volume.zone = Some(string_arg(child)?),
                "snapshot_id" | "snapshot-id" => volume.snapshot_id = Some(string_arg(child)?),
                "tags" => volume.tags = parse_tags(child)?,
                other => return Err(unknown_field("volume", &key, other)),
            }
        }
    }

    volume.size_gb = size.ok_or_else(|| {
        StoreError::InvalidConfig(format!("volume '{key}' には size を指定してください"))
    })?;

    Ok((key, volume))
}

/// snapshot ノードをパース
///
/// `volume` と `import` の排他チェックはバリデーション層で行う。
pub fn parse_snapshot(node: &KdlNode) -> Result<(String, SnapshotTemplate)> {
    let key = template_key(node, ResourceClass::Snapshot)?;

    let mut snapshot = SnapshotTemplate {
        count: 1,
        ..Default::default()
    };

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "name" => snapshot.name = Some(string_arg(child)?),
                "count" => snapshot.count = integer_arg(child)?,
                "zone" => snapshot.zone = Some(string_arg(child)?),
                "volume" | "volume_key" | "volume-key" => {
                    snapshot.volume = Some(Ref::new(string_arg(child)?))
                }
                "import" => snapshot.import = Some(parse_locator(child)?),
                "export" => snapshot.export = Some(parse_locator(child)?),
                "tags" => snapshot.tags = parse_tags(child)?,
                other => return Err(unknown_field("snapshot", &key, other)),
            }
        }
    }

    Ok((key, snapshot))
}

/// import / export ノードをパース
///
/// 例: export bucket="acme-backups" key="db.qcow2"
fn parse_locator(node: &KdlNode) -> Result<ObjectLocator> {
    Ok(ObjectLocator {
        bucket: string_prop(node, "bucket")?,
        key: string_prop(node, "key")?,
    })
}
