//! Listing shape model for shapekit.
//!
//! Defines the types shared by the engine, the stores and the admin tool:
//! - [`Shape`] - a persisted, community-scoped listing shape
//! - [`ShapeForm`] - the writable part of a shape, as judged by validation
//! - [`ShapeInput`] - a partial write request, merged onto a base form
//! - [`Unit`] / [`UnitView`] - canonical and display forms of pricing units
//!
//! Nothing here talks to storage; snapshots go in, values come out.

mod form;
mod shape;
mod units;

pub use form::{ShapeField, ShapeForm, ShapeInput};
pub use shape::{pick_translation, Shape};
pub use units::{expand_units, parse_units, Unit, UnitType, UnitView};
