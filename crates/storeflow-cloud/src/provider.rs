//! Storage provider trait definition

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use storeflow_core::{CorsRule, LifecycleRule, ObjectLocator, Retention, Tags};

/// Storage provider abstraction trait
///
/// Every resource is created exactly once per apply; retries and backoff
/// belong to the implementation (usually the provider SDK).
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Returns the provider name (e.g., "scaleway", "memory")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Check if the provider is properly configured and authenticated
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Resolve a project id from its name within an organization
    async fn lookup_project(&self, name: &str, organization_id: &str) -> Result<String>;

    /// Create a bucket and return its id
    async fn create_bucket(&self, request: &BucketRequest) -> Result<String>;

    /// Create a block volume and return its id
    async fn create_volume(&self, request: &VolumeRequest) -> Result<String>;

    /// Create a block snapshot and return its id
    async fn create_snapshot(&self, request: &SnapshotRequest) -> Result<String>;

    /// Upload an object and return its id
    async fn put_object(&self, request: &ObjectRequest) -> Result<String>;

    /// Attach a policy document to a bucket
    async fn put_bucket_policy(&self, bucket_name: &str, document: &str) -> Result<String>;

    /// Configure the default object lock retention of a bucket
    async fn put_lock_configuration(
        &self,
        bucket_name: &str,
        mode: &str,
        retention: Retention,
    ) -> Result<String>;
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketRequest {
    pub name: String,
    pub region: String,
    pub project_id: Option<String>,
    pub acl: String,
    pub versioning: bool,
    pub object_lock: bool,
    pub force_destroy: bool,
    pub lifecycle_rules: Vec<LifecycleRule>,
    pub cors_rules: Vec<CorsRule>,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeRequest {
    pub name: String,
    pub size_gb: i64,
    pub iops: i64,
    pub zone: String,
    pub project_id: Option<String>,
    /// Externally managed snapshot to restore from
    pub source_snapshot_id: Option<String>,
    pub tags: Tags,
}

/// Where a snapshot is taken from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SnapshotOrigin {
    /// Id of a volume created earlier in the same apply
    Volume { volume_id: String },
    /// QCOW2 image stored in object storage
    Import { locator: ObjectLocator },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRequest {
    pub name: String,
    pub zone: String,
    pub project_id: Option<String>,
    pub origin: SnapshotOrigin,
    pub export: Option<ObjectLocator>,
    pub tags: Tags,
}

/// Object payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectPayload {
    File(PathBuf),
    Content(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRequest {
    pub bucket_name: String,
    pub key: String,
    pub payload: ObjectPayload,
    pub content_type: Option<String>,
    pub visibility: String,
    pub tags: Tags,
}
