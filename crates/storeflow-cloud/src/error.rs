//! Storage provider error types

use thiserror::Error;

/// Storage provider errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource already exists: {0}")]
    ResourceAlreadyExists(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Project not found: {name} (organization: {organization_id})")]
    ProjectNotFound {
        name: String,
        organization_id: String,
    },

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
