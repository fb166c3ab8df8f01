//! In-memory storage provider
//!
//! Keeps every created resource in process memory. Used for `store plan
//! --simulate` and for exercising the executor in tests.

use crate::error::{CloudError, Result};
use crate::provider::{
    AuthStatus, BucketRequest, ObjectRequest, SnapshotOrigin, SnapshotRequest, StorageProvider,
    VolumeRequest,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use storeflow_core::Retention;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
struct MemoryState {
    next_id: u32,
    /// bucket name → request
    buckets: BTreeMap<String, (String, BucketRequest)>,
    /// volume id → request
    volumes: BTreeMap<String, VolumeRequest>,
    /// snapshot id → request
    snapshots: BTreeMap<String, SnapshotRequest>,
    /// (bucket name, key) → request
    objects: BTreeMap<(String, String), ObjectRequest>,
    policies: BTreeMap<String, String>,
    locks: BTreeMap<String, (String, Retention)>,
}

impl MemoryState {
    fn allocate(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{:04}", self.next_id)
    }

    fn bucket(&self, name: &str) -> Result<&BucketRequest> {
        self.buckets
            .get(name)
            .map(|(_, request)| request)
            .ok_or_else(|| CloudError::ResourceNotFound(format!("bucket {name}")))
    }
}

/// Storage provider backed by in-process maps
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    state: Mutex<MemoryState>,
    authenticated: bool,
    /// (name, organization id) → project id
    projects: BTreeMap<(String, String), String>,
    /// Resource names whose creation fails
    failing: BTreeSet<String>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self {
            authenticated: true,
            ..Default::default()
        }
    }

    /// Register a project that `lookup_project` can find
    pub fn with_project(
        mut self,
        name: impl Into<String>,
        organization_id: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        self.projects
            .insert((name.into(), organization_id.into()), project_id.into());
        self
    }

    /// Make the creation of the named resource fail with an API error
    pub fn fail_on(mut self, name: impl Into<String>) -> Self {
        self.failing.insert(name.into());
        self
    }

    pub fn unauthenticated(mut self) -> Self {
        self.authenticated = false;
        self
    }

    fn check_failure(&self, name: &str) -> Result<()> {
        if self.failing.contains(name) {
            return Err(CloudError::ApiError(format!("injected failure for {name}")));
        }
        Ok(())
    }

    pub async fn bucket_names(&self) -> Vec<String> {
        self.state.lock().await.buckets.keys().cloned().collect()
    }

    pub async fn bucket_requests(&self) -> Vec<BucketRequest> {
        let state = self.state.lock().await;
        state.buckets.values().map(|(_, r)| r.clone()).collect()
    }

    pub async fn volume_count(&self) -> usize {
        self.state.lock().await.volumes.len()
    }

    pub async fn snapshot_requests(&self) -> Vec<SnapshotRequest> {
        self.state.lock().await.snapshots.values().cloned().collect()
    }

    pub async fn has_object(&self, bucket: &str, key: &str) -> bool {
        self.state
            .lock()
            .await
            .objects
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    pub async fn policy(&self, bucket: &str) -> Option<String> {
        self.state.lock().await.policies.get(bucket).cloned()
    }

    pub async fn lock_configuration(&self, bucket: &str) -> Option<(String, Retention)> {
        self.state.lock().await.locks.get(bucket).cloned()
    }
}

#[async_trait]
impl StorageProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn display_name(&self) -> &str {
        "In-memory simulation"
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        if self.authenticated {
            Ok(AuthStatus::ok("simulation"))
        } else {
            Ok(AuthStatus::failed("no credentials configured"))
        }
    }

    async fn lookup_project(&self, name: &str, organization_id: &str) -> Result<String> {
        self.projects
            .get(&(name.to_string(), organization_id.to_string()))
            .cloned()
            .ok_or_else(|| CloudError::ProjectNotFound {
                name: name.to_string(),
                organization_id: organization_id.to_string(),
            })
    }

    async fn create_bucket(&self, request: &BucketRequest) -> Result<String> {
        self.check_failure(&request.name)?;
        let mut state = self.state.lock().await;
        if state.buckets.contains_key(&request.name) {
            return Err(CloudError::ResourceAlreadyExists(format!(
                "bucket {}",
                request.name
            )));
        }
        let id = state.allocate("bucket");
        state
            .buckets
            .insert(request.name.clone(), (id.clone(), request.clone()));
        debug!(bucket = %request.name, id = %id, "Created bucket");
        Ok(id)
    }

    async fn create_volume(&self, request: &VolumeRequest) -> Result<String> {
        self.check_failure(&request.name)?;
        let mut state = self.state.lock().await;
        let id = state.allocate("vol");
        state.volumes.insert(id.clone(), request.clone());
        debug!(volume = %request.name, id = %id, "Created volume");
        Ok(id)
    }

    async fn create_snapshot(&self, request: &SnapshotRequest) -> Result<String> {
        self.check_failure(&request.name)?;
        let mut state = self.state.lock().await;
        if let SnapshotOrigin::Volume { volume_id } = &request.origin
            && !state.volumes.contains_key(volume_id)
        {
            return Err(CloudError::ResourceNotFound(format!("volume {volume_id}")));
        }
        let id = state.allocate("snap");
        state.snapshots.insert(id.clone(), request.clone());
        debug!(snapshot = %request.name, id = %id, "Created snapshot");
        Ok(id)
    }

    async fn put_object(&self, request: &ObjectRequest) -> Result<String> {
        self.check_failure(&request.key)?;
        let mut state = self.state.lock().await;
        state.bucket(&request.bucket_name)?;
        let id = format!("{}/{}", request.bucket_name, request.key);
        state.objects.insert(
            (request.bucket_name.clone(), request.key.clone()),
            request.clone(),
        );
        Ok(id)
    }

    async fn put_bucket_policy(&self, bucket_name: &str, document: &str) -> Result<String> {
        let mut state = self.state.lock().await;
        state.bucket(bucket_name)?;
        state
            .policies
            .insert(bucket_name.to_string(), document.to_string());
        Ok(format!("{bucket_name}/policy"))
    }

    async fn put_lock_configuration(
        &self,
        bucket_name: &str,
        mode: &str,
        retention: Retention,
    ) -> Result<String> {
        let mut state = self.state.lock().await;
        if !state.bucket(bucket_name)?.object_lock {
            return Err(CloudError::ApiError(format!(
                "object lock is not enabled on bucket {bucket_name}"
            )));
        }
        state
            .locks
            .insert(bucket_name.to_string(), (mode.to_string(), retention));
        Ok(format!("{bucket_name}/lock"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storeflow_core::Tags;

    fn bucket(name: &str, object_lock: bool) -> BucketRequest {
        BucketRequest {
            name: name.to_string(),
            region: "fr-par".to_string(),
            project_id: None,
            acl: "private".to_string(),
            versioning: object_lock,
            object_lock,
            force_destroy: false,
            lifecycle_rules: Vec::new(),
            cors_rules: Vec::new(),
            tags: Tags::new(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_bucket_rejected() {
        let provider = InMemoryProvider::new();
        let id = provider.create_bucket(&bucket("acme", false)).await.unwrap();
        assert_eq!(id, "bucket-0001");

        let result = provider.create_bucket(&bucket("acme", false)).await;
        assert!(matches!(result, Err(CloudError::ResourceAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_lock_requires_object_lock_bucket() {
        let provider = InMemoryProvider::new();
        provider.create_bucket(&bucket("plain", false)).await.unwrap();
        provider.create_bucket(&bucket("vault", true)).await.unwrap();

        let result = provider
            .put_lock_configuration("plain", "GOVERNANCE", Retention::Days(30))
            .await;
        assert!(matches!(result, Err(CloudError::ApiError(_))));

        provider
            .put_lock_configuration("vault", "GOVERNANCE", Retention::Days(30))
            .await
            .unwrap();
        assert_eq!(
            provider.lock_configuration("vault").await,
            Some(("GOVERNANCE".to_string(), Retention::Days(30)))
        );
    }

    #[tokio::test]
    async fn test_attachment_to_unknown_bucket() {
        let provider = InMemoryProvider::new();
        let result = provider.put_bucket_policy("missing", "{}").await;
        assert!(matches!(result, Err(CloudError::ResourceNotFound(_))));
        assert_eq!(provider.policy("missing").await, None);
    }

    #[tokio::test]
    async fn test_snapshot_from_unknown_volume() {
        let provider = InMemoryProvider::new();
        let request = SnapshotRequest {
            name: "backup".to_string(),
            zone: "fr-par-1".to_string(),
            project_id: None,
            origin: SnapshotOrigin::Volume {
                volume_id: "vol-9999".to_string(),
            },
            export: None,
            tags: Tags::new(),
        };
        let result = provider.create_snapshot(&request).await;
        assert!(matches!(result, Err(CloudError::ResourceNotFound(_))));
    }
}
