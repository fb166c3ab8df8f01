//! Action types for storage resource provisioning

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use storeflow_core::{
    BucketInstance, LockAttachment, ObjectBody, ObjectPlacement, PolicyAttachment, ProjectRef,
    Provenance, ResourceAddress, ResourceClass, SnapshotInstance, StoragePlan, VolumeInstance,
};

/// Represents a planned create action for one resource
#[derive(Debug, Clone, Serialize)]
pub struct Action {
    /// Unique identifier for the action (`{class}.{key}`)
    pub id: String,

    /// Resource class being created
    pub resource_type: ResourceClass,

    /// Expanded key (buckets, volumes, snapshots) or template key (attachments)
    pub resource_key: String,

    /// Description of the action
    pub description: String,

    /// Actions that must succeed before this one runs
    pub depends_on: Vec<String>,

    /// What to create
    pub operation: Operation,
}

/// Resource payload of an action
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "operation", content = "resource", rename_all = "snake_case")]
pub enum Operation {
    CreateBucket(BucketInstance),
    CreateVolume(VolumeInstance),
    CreateSnapshot(SnapshotInstance),
    PutObject(ObjectPlacement),
    PutPolicy(PolicyAttachment),
    PutLock(LockAttachment),
}

/// Action id of a resource
pub fn action_id(class: ResourceClass, key: &str) -> String {
    ResourceAddress::new(class, key).to_string()
}

impl Action {
    fn new(
        resource_type: ResourceClass,
        resource_key: &str,
        description: String,
        depends_on: Vec<String>,
        operation: Operation,
    ) -> Self {
        Self {
            id: action_id(resource_type, resource_key),
            resource_type,
            resource_key: resource_key.to_string(),
            description,
            depends_on,
            operation,
        }
    }

    fn bucket(bucket: &BucketInstance) -> Self {
        Self::new(
            ResourceClass::Bucket,
            bucket.key.as_str(),
            format!("バケット {} を作成 ({})", bucket.name, bucket.location),
            Vec::new(),
            Operation::CreateBucket(bucket.clone()),
        )
    }

    fn volume(volume: &VolumeInstance) -> Self {
        Self::new(
            ResourceClass::Volume,
            volume.key.as_str(),
            format!(
                "ボリューム {} を作成 ({}GB, {} IOPS, {})",
                volume.name, volume.spec.size_gb, volume.spec.iops, volume.location
            ),
            Vec::new(),
            Operation::CreateVolume(volume.clone()),
        )
    }

    fn snapshot(snapshot: &SnapshotInstance) -> Self {
        let (origin, depends_on) = match &snapshot.provenance {
            Provenance::Volume { volume } => (
                format!("ボリューム {} から", volume.name),
                vec![action_id(ResourceClass::Volume, volume.key.as_str())],
            ),
            Provenance::Import { locator } => (
                format!("{}/{} からインポート", locator.bucket, locator.key),
                Vec::new(),
            ),
        };
        Self::new(
            ResourceClass::Snapshot,
            snapshot.instance.key.as_str(),
            format!("スナップショット {} を作成 ({origin})", snapshot.instance.name),
            depends_on,
            Operation::CreateSnapshot(snapshot.clone()),
        )
    }

    fn object(key: &str, object: &ObjectPlacement) -> Self {
        let source = match &object.body {
            ObjectBody::File { path } => path.display().to_string(),
            ObjectBody::Content { content } => format!("{}バイト", content.len()),
        };
        Self::new(
            ResourceClass::Object,
            key,
            format!(
                "オブジェクト {} を {} に配置 ({source})",
                object.key, object.bucket.name
            ),
            vec![action_id(ResourceClass::Bucket, object.bucket.key.as_str())],
            Operation::PutObject(object.clone()),
        )
    }

    fn policy(key: &str, policy: &PolicyAttachment) -> Self {
        Self::new(
            ResourceClass::Policy,
            key,
            format!("バケット {} にポリシーを設定", policy.bucket.name),
            vec![action_id(ResourceClass::Bucket, policy.bucket.key.as_str())],
            Operation::PutPolicy(policy.clone()),
        )
    }

    fn lock(key: &str, lock: &LockAttachment) -> Self {
        Self::new(
            ResourceClass::Lock,
            key,
            format!(
                "バケット {} にオブジェクトロックを設定 ({}, {})",
                lock.bucket.name, lock.mode, lock.retention
            ),
            vec![action_id(ResourceClass::Bucket, lock.bucket.key.as_str())],
            Operation::PutLock(lock.clone()),
        )
    }
}

/// Result of applying actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    /// Successfully applied actions
    pub succeeded: Vec<ActionResult>,

    /// Failed actions (including those skipped because a dependency failed)
    pub failed: Vec<ActionResult>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, action_id: String, resource_id: String, message: String) {
        self.succeeded.push(ActionResult {
            action_id,
            success: true,
            resource_id: Some(resource_id),
            message,
            error: None,
        });
    }

    pub fn add_failure(&mut self, action_id: String, error: String) {
        self.failed.push(ActionResult {
            action_id,
            success: false,
            resource_id: None,
            message: String::new(),
            error: Some(error),
        });
    }

    /// Provider id created for an action
    pub fn resource_id(&self, action_id: &str) -> Option<&str> {
        self.succeeded
            .iter()
            .find(|r| r.action_id == action_id)
            .and_then(|r| r.resource_id.as_deref())
    }
}

impl Default for ApplyResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a single action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// ID of the action
    pub action_id: String,

    /// Whether the action succeeded
    pub success: bool,

    /// Id assigned by the provider
    pub resource_id: Option<String>,

    /// Success message
    pub message: String,

    /// Error message if failed
    pub error: Option<String>,
}

/// Plan containing all actions to be applied, in dependency order
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    /// List of actions to perform
    pub actions: Vec<Action>,

    /// Project the resources are created in
    pub project: Option<ProjectRef>,
}

impl Plan {
    /// Order the actions so every dependency precedes its dependents
    ///
    /// Within one dependency level the input order is kept.
    pub fn new(actions: Vec<Action>, project: Option<ProjectRef>) -> Result<Self> {
        let ids: BTreeSet<&str> = actions.iter().map(|a| a.id.as_str()).collect();
        if ids.len() != actions.len() {
            return Err(CloudError::InvalidPlan("duplicate action id".to_string()));
        }
        for action in &actions {
            if let Some(missing) = action.depends_on.iter().find(|d| !ids.contains(d.as_str())) {
                return Err(CloudError::InvalidPlan(format!(
                    "{} depends on unknown action {missing}",
                    action.id
                )));
            }
        }

        let mut pending = actions;
        let mut ordered: Vec<Action> = Vec::with_capacity(pending.len());
        let mut done: BTreeSet<String> = BTreeSet::new();

        while !pending.is_empty() {
            let (ready, blocked): (Vec<Action>, Vec<Action>) = pending
                .into_iter()
                .partition(|a| a.depends_on.iter().all(|d| done.contains(d)));
            if ready.is_empty() {
                let stuck: Vec<&str> = blocked.iter().map(|a| a.id.as_str()).collect();
                return Err(CloudError::InvalidPlan(format!(
                    "dependency cycle between {}",
                    stuck.join(", ")
                )));
            }
            done.extend(ready.iter().map(|a| a.id.clone()));
            ordered.extend(ready);
            pending = blocked;
        }

        Ok(Self {
            actions: ordered,
            project,
        })
    }

    /// Build create actions for every resource of a storage plan
    pub fn from_storage_plan(plan: &StoragePlan) -> Result<Self> {
        let mut actions = Vec::with_capacity(plan.resource_count());

        actions.extend(plan.buckets.values().map(Action::bucket));
        actions.extend(plan.volumes.values().map(Action::volume));
        actions.extend(plan.snapshots.values().map(Action::snapshot));
        actions.extend(plan.objects.iter().map(|(k, o)| Action::object(k, o)));
        actions.extend(plan.policies.iter().map(|(k, p)| Action::policy(k, p)));
        actions.extend(plan.locks.iter().map(|(k, l)| Action::lock(k, l)));

        Self::new(actions, plan.settings.project())
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Serialize the ordered actions as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Get actions by resource type
    pub fn actions_by_type(&self, resource_type: ResourceClass) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.resource_type == resource_type)
            .collect()
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        let mut counts: BTreeMap<ResourceClass, usize> = BTreeMap::new();
        for action in &self.actions {
            *counts.entry(action.resource_type).or_default() += 1;
        }
        let count = |class: ResourceClass| counts.get(&class).copied().unwrap_or(0);

        PlanSummary {
            buckets: count(ResourceClass::Bucket),
            volumes: count(ResourceClass::Volume),
            snapshots: count(ResourceClass::Snapshot),
            objects: count(ResourceClass::Object),
            policies: count(ResourceClass::Policy),
            locks: count(ResourceClass::Lock),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub buckets: usize,
    pub volumes: usize,
    pub snapshots: usize,
    pub objects: usize,
    pub policies: usize,
    pub locks: usize,
}

impl PlanSummary {
    pub fn total(&self) -> usize {
        self.buckets + self.volumes + self.snapshots + self.objects + self.policies + self.locks
    }
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create: {} buckets, {} volumes, {} snapshots, {} objects, {} policies, {} locks",
            self.total(),
            self.buckets,
            self.volumes,
            self.snapshots,
            self.objects,
            self.policies,
            self.locks
        )
    }
}
