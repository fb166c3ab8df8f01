//! settings ノードのパース

use super::{parse_tags, string_arg, unknown_field};
use crate::error::Result;
use crate::model::Settings;
use kdl::KdlNode;

/// settings ノードをパース
pub fn parse_settings(node: &KdlNode) -> Result<Settings> {
    let mut settings = Settings::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "region" => settings.region = Some(string_arg(child)?),
                "zone" => settings.zone = Some(string_arg(child)?),
                "project_id" | "project-id" => settings.project_id = Some(string_arg(child)?),
                "project" => settings.project_name = Some(string_arg(child)?),
                "organization_id" | "organization-id" => {
                    settings.organization_id = Some(string_arg(child)?)
                }
                "tags" => settings.tags = parse_tags(child)?,
                other => return Err(unknown_field("settings", "-", other)),
            }
        }
    }

    Ok(settings)
}
