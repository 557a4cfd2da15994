//! Listing shape configuration engine for shapekit.
//!
//! Three pure components decide what may be written:
//! - [`validate`] - the cross-field business rules of a shape
//! - [`editability`] - which fields a community may edit, and stripping the rest
//! - [`reorder`] - the minimal priority diff that realizes a new display order
//!
//! [`ShapeService`] wires them to the storage collaborators declared in
//! [`store`]: a write passes the editability gate, is merged onto its base
//! form, validated, and only then handed to the [`ShapeStore`].

pub mod config;
pub mod editability;
mod error;
pub mod reorder;
mod service;
pub mod store;
pub mod validate;

pub use config::{ConfigError, ShapeConfig};
pub use editability::{editable_mask, filter_uneditable, CapabilitySet, EditableFields};
pub use error::{RejectedShape, ShapeError, ShapeResult, StoreError, StoreResult};
pub use reorder::{distinguishable_order, reorder, PriorityUpdate, ReorderError};
pub use service::{ShapeService, ShapeView};
pub use store::{
    ListingDirectory, MemoryListings, MemoryShapeStore, NewShape, ProcessLookup, ShapeStore,
    ShapeUpdate, StaticProcesses,
};
pub use validate::{validate, ShapeRule, ValidationErrors};
