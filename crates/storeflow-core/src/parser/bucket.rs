//! bucket ノードのパース

use super::{
    arguments, bool_arg, integer_arg, integer_prop, parse_tags, string_arg, string_args,
    string_prop, template_key, unknown_field,
};
use crate::error::{Result, StoreError};
use crate::model::{BucketTemplate, CorsRule, LifecycleRule, ResourceClass, Transition};
use kdl::KdlNode;

/// bucket ノードをパース
pub fn parse_bucket(node: &KdlNode) -> Result<(String, BucketTemplate)> {
    let key = template_key(node, ResourceClass::Bucket)?;

    let mut name = None;
    let mut bucket = BucketTemplate::new("");

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "name" => name = Some(string_arg(child)?),
                "count" => bucket.count = integer_arg(child)?,
                "region" => bucket.region = Some(string_arg(child)?),
                "acl" => bucket.acl = string_arg(child)?,
                "versioning" => bucket.versioning = bool_arg(child)?,
                "object_lock" | "object-lock" => bucket.object_lock = bool_arg(child)?,
                "force_destroy" | "force-destroy" => bucket.force_destroy = bool_arg(child)?,
                "tags" => bucket.tags = parse_tags(child)?,
                "lifecycle" => bucket.lifecycle_rules.push(parse_lifecycle(child, &key)?),
                "cors" => bucket.cors_rules.push(parse_cors(child, &key)?),
                other => return Err(unknown_field("bucket", &key, other)),
            }
        }
    }

    // バケットは名前必須（グローバルに一意な名前空間のため既定名を持たない）
    bucket.name = name.ok_or_else(|| {
        StoreError::InvalidConfig(format!("bucket '{key}' には name を指定してください"))
    })?;

    Ok((key, bucket))
}

/// lifecycle ブロックをパース
///
/// 例:
/// ```kdl
/// lifecycle "archive-logs" {
///     prefix "logs/"
///     transition days=30 storage-class="GLACIER"
///     expiration-days 365
/// }
/// ```
fn parse_lifecycle(node: &KdlNode, bucket_key: &str) -> Result<LifecycleRule> {
    let id = arguments(node)
        .next()
        .and_then(|v| v.as_string())
        .unwrap_or("")
        .to_string();
    let mut rule = LifecycleRule::new(id);

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "prefix" => rule.prefix = Some(string_arg(child)?),
                "enabled" => rule.enabled = bool_arg(child)?,
                "expiration_days" | "expiration-days" => {
                    rule.expiration_days = Some(integer_arg(child)?)
                }
                "transition" => rule.transitions.push(Transition {
                    days: integer_prop(child, "days")?,
                    storage_class: string_prop(child, "storage-class")
                        .or_else(|_| string_prop(child, "storage_class"))?,
                }),
                "abort_incomplete_upload_days" | "abort-incomplete-upload-days" => {
                    rule.abort_incomplete_upload_days = Some(integer_arg(child)?)
                }
                other => return Err(unknown_field("lifecycle", bucket_key, other)),
            }
        }
    }

    Ok(rule)
}

/// cors ブロックをパース
fn parse_cors(node: &KdlNode, bucket_key: &str) -> Result<CorsRule> {
    let mut rule = CorsRule::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "allowed_origins" | "allowed-origins" => rule.allowed_origins = string_args(child),
                "allowed_methods" | "allowed-methods" => rule.allowed_methods = string_args(child),
                "allowed_headers" | "allowed-headers" => rule.allowed_headers = string_args(child),
                "expose_headers" | "expose-headers" => rule.expose_headers = string_args(child),
                "max_age_seconds" | "max-age-seconds" => {
                    rule.max_age_seconds = Some(integer_arg(child)?)
                }
                other => return Err(unknown_field("cors", bucket_key, other)),
            }
        }
    }

    Ok(rule)
}
