//! Error types for the shape engine.

use crate::reorder::ReorderError;
use crate::validate::ValidationErrors;
use shapekit_model::ShapeForm;
use shapekit_types::{CommunityId, ShapeId};
use thiserror::Error;

/// Result type for service operations.
pub type ShapeResult<T> = Result<T, ShapeError>;

/// Result type for storage collaborators.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by [`crate::ShapeService`].
#[derive(Debug, Error)]
pub enum ShapeError {
    /// One or more business rules failed; carries the rejected form.
    #[error(transparent)]
    Validation(#[from] RejectedShape),

    /// No shape with this id in the community.
    #[error("can not find listing shape {shape_id} in community {community_id}")]
    NotFound {
        community_id: CommunityId,
        shape_id: ShapeId,
    },

    /// The requested order can not be realized.
    #[error("invalid shape order: {0}")]
    Reorder(#[from] ReorderError),

    /// The community's highest priority leaves no room for a new shape.
    #[error("no sort priority left after {after} in community {community_id}")]
    PriorityOverflow {
        community_id: CommunityId,
        after: i64,
    },

    /// A storage or lookup collaborator failed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// A form that failed validation, kept so the caller can show it again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{errors}")]
pub struct RejectedShape {
    pub form: ShapeForm,
    pub errors: ValidationErrors,
}

/// Errors reported by storage and lookup collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
