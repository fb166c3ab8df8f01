//! StoreFlow Cloud Storage
//!
//! This crate turns a resolved [`storeflow_core::StoragePlan`] into an ordered
//! list of create actions and executes them against a storage provider.
//!
//! # Providers
//!
//! - **memory**: In-process simulation (`store plan --simulate`)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  StoreFlow CLI                   │
//! │              (store plan --simulate)             │
//! └─────────────────┬───────────────────────────────┘
//!                   │ StoragePlan
//! ┌─────────────────▼───────────────────────────────┐
//! │                storeflow-cloud                   │
//! │  ┌──────────────┐  ┌──────────────────────┐     │
//! │  │ Plan/Action  │─▶│ apply (executor)     │     │
//! │  └──────────────┘  └──────────┬───────────┘     │
//! │  ┌────────────────────────────▼─────────────┐   │
//! │  │  trait StorageProvider { ... }            │   │
//! │  └──────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod action;
pub mod apply;
pub mod error;
pub mod memory;
pub mod provider;

// Re-exports
pub use action::{Action, ActionResult, ApplyResult, Operation, Plan, PlanSummary, action_id};
pub use apply::apply;
pub use error::{CloudError, Result};
pub use memory::InMemoryProvider;
pub use provider::{
    AuthStatus, BucketRequest, ObjectPayload, ObjectRequest, SnapshotOrigin, SnapshotRequest,
    StorageProvider, VolumeRequest,
};
