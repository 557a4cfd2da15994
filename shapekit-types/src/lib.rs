//! Core type definitions for shapekit.
//!
//! This crate defines the small, storage-agnostic types the rest of the
//! workspace builds on:
//! - Shape, community and category identifiers
//! - Transaction process descriptors consumed by the editability gate
//!
//! Shape configuration itself (names, flags, units) lives in `shapekit-model`.

mod ids;
mod process;

pub use ids::{CategoryId, CommunityId, ShapeId};
pub use process::{ProcessKind, TransactionProcess};

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid id: {0}")]
    InvalidId(#[from] std::num::ParseIntError),

    #[error("unknown transaction process: {0}")]
    UnknownProcess(String),
}
