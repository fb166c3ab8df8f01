//! Plan executor
//!
//! Runs the actions of a [`Plan`] sequentially against a [`StorageProvider`].
//! An action only runs once every action it depends on has succeeded; when a
//! dependency failed the action is recorded as failed without touching the
//! provider.

use crate::action::{Action, ApplyResult, Operation, Plan, action_id};
use crate::error::{CloudError, Result};
use crate::provider::{
    BucketRequest, ObjectPayload, ObjectRequest, SnapshotOrigin, SnapshotRequest,
    StorageProvider, VolumeRequest,
};
use std::collections::HashMap;
use std::time::Instant;
use storeflow_core::{ObjectBody, ProjectRef, Provenance, ResourceClass};
use tracing::{debug, info, warn};

/// Apply every action of the plan
///
/// Fails early only when authentication or project resolution fails; errors
/// of individual actions are collected in the returned [`ApplyResult`].
pub async fn apply(provider: &dyn StorageProvider, plan: &Plan) -> Result<ApplyResult> {
    let start = Instant::now();

    let auth = provider.check_auth().await?;
    if !auth.authenticated {
        return Err(CloudError::AuthenticationFailed(
            auth.error.unwrap_or_else(|| provider.display_name().to_string()),
        ));
    }

    let project_id = resolve_project(provider, plan.project.as_ref()).await?;
    let mut executor = Executor {
        provider,
        project_id,
        created: HashMap::new(),
        result: ApplyResult::new(),
    };

    for action in &plan.actions {
        executor.run(action).await;
    }

    let mut result = executor.result;
    result.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        provider = provider.name(),
        succeeded = result.succeeded.len(),
        failed = result.failed.len(),
        duration_ms = result.duration_ms,
        "Apply finished"
    );
    Ok(result)
}

async fn resolve_project(
    provider: &dyn StorageProvider,
    project: Option<&ProjectRef>,
) -> Result<Option<String>> {
    match project {
        None => Ok(None),
        Some(ProjectRef::Id(id)) => Ok(Some(id.clone())),
        Some(ProjectRef::Lookup {
            name,
            organization_id,
        }) => {
            let id = provider.lookup_project(name, organization_id).await?;
            debug!(project = %name, id = %id, "Resolved project");
            Ok(Some(id))
        }
    }
}

struct Executor<'a> {
    provider: &'a dyn StorageProvider,
    project_id: Option<String>,
    /// action id → provider id
    created: HashMap<String, String>,
    result: ApplyResult,
}

impl Executor<'_> {
    async fn run(&mut self, action: &Action) {
        if let Some(dependency) = action
            .depends_on
            .iter()
            .find(|d| !self.created.contains_key(*d))
        {
            warn!(
                action = %action.id,
                dependency = %dependency,
                "Skipping action because a dependency did not succeed"
            );
            self.result.add_failure(
                action.id.clone(),
                format!("依存するアクション {dependency} が失敗したためスキップしました"),
            );
            return;
        }

        info!(action = %action.id, "{}", action.description);

        match self.execute(action).await {
            Ok((id, message)) => {
                self.created.insert(action.id.clone(), id.clone());
                self.result.add_success(action.id.clone(), id, message);
            }
            Err(e) => {
                warn!(action = %action.id, error = %e, "Action failed");
                self.result.add_failure(action.id.clone(), e.to_string());
            }
        }
    }

    async fn execute(&self, action: &Action) -> Result<(String, String)> {
        match &action.operation {
            Operation::CreateBucket(bucket) => {
                let request = BucketRequest {
                    name: bucket.name.clone(),
                    region: bucket.location.clone(),
                    project_id: self.project_id.clone(),
                    acl: bucket.spec.acl.clone(),
                    versioning: bucket.spec.versioning,
                    object_lock: bucket.spec.object_lock,
                    force_destroy: bucket.spec.force_destroy,
                    lifecycle_rules: bucket.spec.lifecycle_rules.clone(),
                    cors_rules: bucket.spec.cors_rules.clone(),
                    tags: bucket.tags.clone(),
                };
                let id = self.provider.create_bucket(&request).await?;
                let message = format!("バケット {} を作成しました (ID: {id})", request.name);
                Ok((id, message))
            }
            Operation::CreateVolume(volume) => {
                let request = VolumeRequest {
                    name: volume.name.clone(),
                    size_gb: volume.spec.size_gb,
                    iops: volume.spec.iops,
                    zone: volume.location.clone(),
                    project_id: self.project_id.clone(),
                    source_snapshot_id: volume.spec.snapshot_id.clone(),
                    tags: volume.tags.clone(),
                };
                let id = self.provider.create_volume(&request).await?;
                let message = format!("ボリューム {} を作成しました (ID: {id})", request.name);
                Ok((id, message))
            }
            Operation::CreateSnapshot(snapshot) => {
                let origin = match &snapshot.provenance {
                    Provenance::Volume { volume } => SnapshotOrigin::Volume {
                        volume_id: self.created_id(ResourceClass::Volume, volume.key.as_str())?,
                    },
                    Provenance::Import { locator } => SnapshotOrigin::Import {
                        locator: locator.clone(),
                    },
                };
                let request = SnapshotRequest {
                    name: snapshot.instance.name.clone(),
                    zone: snapshot.instance.location.clone(),
                    project_id: self.project_id.clone(),
                    origin,
                    export: snapshot.export.clone(),
                    tags: snapshot.instance.tags.clone(),
                };
                let id = self.provider.create_snapshot(&request).await?;
                let message = format!(
                    "スナップショット {} を作成しました (ID: {id})",
                    request.name
                );
                Ok((id, message))
            }
            Operation::PutObject(object) => {
                let payload = match &object.body {
                    ObjectBody::File { path } => ObjectPayload::File(path.clone()),
                    ObjectBody::Content { content } => ObjectPayload::Content(content.clone()),
                };
                let request = ObjectRequest {
                    bucket_name: object.bucket.name.clone(),
                    key: object.key.clone(),
                    payload,
                    content_type: object.spec.content_type.clone(),
                    visibility: object.spec.visibility.clone(),
                    tags: object.tags.clone(),
                };
                let id = self.provider.put_object(&request).await?;
                let message = format!(
                    "オブジェクト {} を {} に配置しました",
                    request.key, request.bucket_name
                );
                Ok((id, message))
            }
            Operation::PutPolicy(policy) => {
                let id = self
                    .provider
                    .put_bucket_policy(&policy.bucket.name, &policy.document)
                    .await?;
                let message = format!("バケット {} にポリシーを設定しました", policy.bucket.name);
                Ok((id, message))
            }
            Operation::PutLock(lock) => {
                let id = self
                    .provider
                    .put_lock_configuration(&lock.bucket.name, &lock.mode, lock.retention)
                    .await?;
                let message = format!(
                    "バケット {} にオブジェクトロックを設定しました ({}, {})",
                    lock.bucket.name, lock.mode, lock.retention
                );
                Ok((id, message))
            }
        }
    }

    fn created_id(&self, class: ResourceClass, key: &str) -> Result<String> {
        let id = action_id(class, key);
        self.created
            .get(&id)
            .cloned()
            .ok_or_else(|| CloudError::InvalidPlan(format!("{id} has not been created")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryProvider;
    use storeflow_core::{
        BucketTemplate, LockTemplate, ObjectLocator, ObjectTemplate, Settings, SnapshotTemplate,
        TemplateSet, VolumeTemplate, plan,
    };

    fn template_set() -> TemplateSet {
        let mut set = TemplateSet::new();
        let mut vault = BucketTemplate::new("acme-vault");
        vault.versioning = true;
        vault.object_lock = true;
        set.buckets.insert("vault".to_string(), vault);
        set.volumes.insert(
            "database".to_string(),
            VolumeTemplate::new(50).with_count(2),
        );
        set.snapshots.insert(
            "backup".to_string(),
            SnapshotTemplate::from_volume("database-2")
                .with_export(ObjectLocator::new("acme-vault", "db.qcow2")),
        );
        set.objects.insert(
            "readme".to_string(),
            ObjectTemplate::new("vault-1", "README.md").with_content("hello"),
        );
        set.locks.insert(
            "retain".to_string(),
            LockTemplate::new("vault-1", "COMPLIANCE").with_years(1),
        );
        set
    }

    fn build_plan(set: &TemplateSet) -> Plan {
        Plan::from_storage_plan(&plan(set).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_apply_creates_everything() {
        let provider = InMemoryProvider::new();
        let plan = build_plan(&template_set());

        let result = apply(&provider, &plan).await.unwrap();

        assert!(result.is_success());
        assert_eq!(result.succeeded.len(), 6);
        assert_eq!(provider.bucket_names().await, vec!["acme-vault"]);
        assert_eq!(provider.volume_count().await, 2);
        assert!(provider.has_object("acme-vault", "README.md").await);
    }

    #[tokio::test]
    async fn test_snapshot_receives_created_volume_id() {
        let provider = InMemoryProvider::new();
        let plan = build_plan(&template_set());

        let result = apply(&provider, &plan).await.unwrap();

        let volume_id = result.resource_id("volume.database-2").unwrap();
        let snapshots = provider.snapshot_requests().await;
        assert_eq!(snapshots.len(), 1);
        assert_eq!(
            snapshots[0].origin,
            SnapshotOrigin::Volume {
                volume_id: volume_id.to_string()
            }
        );
        assert_eq!(
            snapshots[0].export,
            Some(ObjectLocator::new("acme-vault", "db.qcow2"))
        );
    }

    #[tokio::test]
    async fn test_failed_dependency_skips_dependents() {
        let provider = InMemoryProvider::new().fail_on("database-2-volume");
        let plan = build_plan(&template_set());

        let result = apply(&provider, &plan).await.unwrap();

        let failed: Vec<&str> = result.failed.iter().map(|r| r.action_id.as_str()).collect();
        assert_eq!(failed, vec!["volume.database-2", "snapshot.backup-1"]);
        assert_eq!(provider.snapshot_requests().await.len(), 0);
        assert!(
            result.failed[1]
                .error
                .as_deref()
                .unwrap()
                .contains("volume.database-2")
        );

        // 依存関係のないリソースは作成される
        assert_eq!(result.succeeded.len(), 4);
        assert_eq!(provider.volume_count().await, 1);
    }

    #[tokio::test]
    async fn test_project_lookup() {
        let provider =
            InMemoryProvider::new().with_project("storage", "org-1", "project-1234");
        let mut set = template_set();
        set.settings = Settings {
            project_name: Some("storage".to_string()),
            organization_id: Some("org-1".to_string()),
            ..Default::default()
        };

        apply(&provider, &build_plan(&set)).await.unwrap();

        let buckets = provider.bucket_requests().await;
        assert_eq!(buckets[0].project_id, Some("project-1234".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_project_fails_before_any_action() {
        let provider = InMemoryProvider::new();
        let mut set = template_set();
        set.settings.project_name = Some("missing".to_string());
        set.settings.organization_id = Some("org-1".to_string());

        let result = apply(&provider, &build_plan(&set)).await;

        assert!(matches!(result, Err(CloudError::ProjectNotFound { .. })));
        assert!(provider.bucket_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_unauthenticated_provider() {
        let provider = InMemoryProvider::new().unauthenticated();
        let plan = build_plan(&template_set());

        let result = apply(&provider, &plan).await;
        assert!(matches!(result, Err(CloudError::AuthenticationFailed(_))));
    }
}
