//! SQLite storage for listing shapes.
//!
//! Implements the engine's [`ShapeStore`](shapekit_engine::ShapeStore) and
//! [`ListingDirectory`](shapekit_engine::ListingDirectory) over one SQLite
//! file. Names and units are stored as JSON columns; category links and
//! listings live in their own tables.
//!
//! Reorder diffs are applied in a single transaction. Two admins reordering
//! at the same time still race: whichever commits last wins.

mod sqlite;

pub use sqlite::SqliteShapeStore;
