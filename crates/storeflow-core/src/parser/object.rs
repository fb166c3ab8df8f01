//! object / policy / lock ノードのパース

use super::{integer_arg, parse_tags, string_arg, template_key, unknown_field};
use crate::error::{Result, StoreError};
use crate::model::{LockTemplate, ObjectTemplate, PolicyTemplate, Ref, ResourceClass};
use kdl::KdlNode;
use std::path::PathBuf;

fn required<T>(value: Option<T>, owner: &str, key: &str, field: &str) -> Result<T> {
    value.ok_or_else(|| {
        StoreError::InvalidConfig(format!("{owner} '{key}' には {field} を指定してください"))
    })
}

/// object ノードをパース
pub fn parse_object(node: &KdlNode) -> Result<(String, ObjectTemplate)> {
    let key = template_key(node, ResourceClass::Object)?;

    let mut bucket = None;
    let mut object_key = None;
    let mut object = ObjectTemplate::new("", "");

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "bucket" | "bucket_key" | "bucket-key" => bucket = Some(string_arg(child)?),
                "key" => object_key = Some(string_arg(child)?),
                "file" | "source" => object.file = Some(PathBuf::from(string_arg(child)?)),
                "content" => object.content = Some(string_arg(child)?),
                "content_type" | "content-type" => object.content_type = Some(string_arg(child)?),
                "visibility" => object.visibility = string_arg(child)?,
                "tags" => object.tags = parse_tags(child)?,
                other => return Err(unknown_field("object", &key, other)),
            }
        }
    }

    object.bucket = Ref::new(required(bucket, "object", &key, "bucket")?);
    object.key = required(object_key, "object", &key, "key")?;

    Ok((key, object))
}

/// policy ノードをパース
pub fn parse_policy(node: &KdlNode) -> Result<(String, PolicyTemplate)> {
    let key = template_key(node, ResourceClass::Policy)?;

    let mut bucket = None;
    let mut document = None;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "bucket" | "bucket_key" | "bucket-key" => bucket = Some(string_arg(child)?),
                "document" => document = Some(string_arg(child)?),
                other => return Err(unknown_field("policy", &key, other)),
            }
        }
    }

    let policy = PolicyTemplate::new(
        required(bucket, "policy", &key, "bucket")?,
        required(document, "policy", &key, "document")?,
    );

    Ok((key, policy))
}

/// lock ノードをパース
pub fn parse_lock(node: &KdlNode) -> Result<(String, LockTemplate)> {
    let key = template_key(node, ResourceClass::Lock)?;

    let mut bucket = None;
    let mut lock = LockTemplate::new("", "GOVERNANCE");

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "bucket" | "bucket_key" | "bucket-key" => bucket = Some(string_arg(child)?),
                "mode" => lock.mode = string_arg(child)?,
                "days" => lock.days = Some(integer_arg(child)?),
                "years" => lock.years = Some(integer_arg(child)?),
                other => return Err(unknown_field("lock", &key, other)),
            }
        }
    }

    lock.bucket = Ref::new(required(bucket, "lock", &key, "bucket")?);

    Ok((key, lock))
}
