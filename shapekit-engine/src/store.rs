//! Storage and lookup collaborators.
//!
//! The engine never owns persistence. It reads snapshots through these
//! traits and hands back validated forms or priority diffs. Every call is
//! scoped to one community; an unknown id yields `None`, not an error.
//!
//! In-memory implementations are provided for embedding and tests.

use crate::error::{StoreError, StoreResult};
use crate::reorder::PriorityUpdate;
use shapekit_model::{Shape, ShapeForm};
use shapekit_types::{CategoryId, CommunityId, ShapeId, TransactionProcess};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

/// Data for a shape that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShape {
    pub form: ShapeForm,
    pub sort_priority: i64,
    pub categories: BTreeSet<CategoryId>,
}

/// A change to an existing shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeUpdate {
    /// Replace the writable fields with an already validated form.
    Form(ShapeForm),
    /// Move the shape in the display order.
    SortPriority(i64),
}

/// Persistence of listing shapes.
pub trait ShapeStore: Send + Sync {
    fn get(
        &self,
        community_id: CommunityId,
        shape_id: ShapeId,
        include_categories: bool,
    ) -> StoreResult<Option<Shape>>;

    /// All shapes of the community in display order: ascending
    /// `sort_priority`, ties in storage order.
    fn get_all(&self, community_id: CommunityId, include_categories: bool) -> StoreResult<Vec<Shape>>;

    fn create(&self, community_id: CommunityId, shape: NewShape) -> StoreResult<Shape>;

    fn update(
        &self,
        community_id: CommunityId,
        shape_id: ShapeId,
        update: ShapeUpdate,
    ) -> StoreResult<Option<Shape>>;

    fn delete(&self, community_id: CommunityId, shape_id: ShapeId) -> StoreResult<Option<Shape>>;

    /// Writes a reorder diff. Shapes that vanished since the snapshot are
    /// skipped. Stores with transactions should override this to apply the
    /// diff atomically.
    fn apply_priorities(
        &self,
        community_id: CommunityId,
        updates: &[PriorityUpdate],
    ) -> StoreResult<()> {
        for update in updates {
            self.update(
                community_id,
                update.id,
                ShapeUpdate::SortPriority(update.sort_priority),
            )?;
        }
        Ok(())
    }
}

/// Source of a community's configured transaction processes.
pub trait ProcessLookup: Send + Sync {
    fn processes(&self, community_id: CommunityId) -> StoreResult<Vec<TransactionProcess>>;
}

/// The listings attached to shapes.
pub trait ListingDirectory: Send + Sync {
    /// Open listings using the shape. Advisory only.
    fn count_open_listings(&self, shape_id: ShapeId) -> StoreResult<u64>;

    /// Closes the shape's open listings, optionally detaching every listing
    /// from the shape. Returns the number of listings touched.
    fn close_listings(&self, shape_id: ShapeId, detach: bool) -> StoreResult<u64>;
}

// ── In-memory shape store ────────────────────────────────────────

#[derive(Debug, Default)]
struct MemoryState {
    next_id: u64,
    /// Shapes with their categories, in insertion order.
    shapes: Vec<(Shape, BTreeSet<CategoryId>)>,
}

/// A [`ShapeStore`] kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryShapeStore {
    state: Mutex<MemoryState>,
}

impl MemoryShapeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Database("memory store lock poisoned".to_string()))
    }
}

fn with_categories(shape: &Shape, categories: &BTreeSet<CategoryId>, include: bool) -> Shape {
    let mut shape = shape.clone();
    shape.categories = include.then(|| categories.clone());
    shape
}

impl ShapeStore for MemoryShapeStore {
    fn get(
        &self,
        community_id: CommunityId,
        shape_id: ShapeId,
        include_categories: bool,
    ) -> StoreResult<Option<Shape>> {
        let state = self.state()?;
        Ok(state
            .shapes
            .iter()
            .find(|(s, _)| s.community_id == community_id && s.id == shape_id)
            .map(|(s, c)| with_categories(s, c, include_categories)))
    }

    fn get_all(&self, community_id: CommunityId, include_categories: bool) -> StoreResult<Vec<Shape>> {
        let state = self.state()?;
        let mut shapes: Vec<Shape> = state
            .shapes
            .iter()
            .filter(|(s, _)| s.community_id == community_id)
            .map(|(s, c)| with_categories(s, c, include_categories))
            .collect();
        // Stable: ties keep insertion order.
        shapes.sort_by_key(|s| s.sort_priority);
        Ok(shapes)
    }

    fn create(&self, community_id: CommunityId, shape: NewShape) -> StoreResult<Shape> {
        let mut state = self.state()?;
        state.next_id += 1;
        let mut created = Shape {
            id: ShapeId::new(state.next_id),
            community_id,
            name: Default::default(),
            sort_priority: shape.sort_priority,
            shipping_enabled: false,
            online_payments: false,
            price_enabled: false,
            units: Vec::new(),
            categories: None,
        };
        created.apply_form(shape.form);
        state.shapes.push((created.clone(), shape.categories));
        Ok(created)
    }

    fn update(
        &self,
        community_id: CommunityId,
        shape_id: ShapeId,
        update: ShapeUpdate,
    ) -> StoreResult<Option<Shape>> {
        let mut state = self.state()?;
        let Some((shape, _)) = state
            .shapes
            .iter_mut()
            .find(|(s, _)| s.community_id == community_id && s.id == shape_id)
        else {
            return Ok(None);
        };

        match update {
            ShapeUpdate::Form(form) => shape.apply_form(form),
            ShapeUpdate::SortPriority(priority) => shape.sort_priority = priority,
        }
        Ok(Some(shape.clone()))
    }

    fn delete(&self, community_id: CommunityId, shape_id: ShapeId) -> StoreResult<Option<Shape>> {
        let mut state = self.state()?;
        let position = state
            .shapes
            .iter()
            .position(|(s, _)| s.community_id == community_id && s.id == shape_id);
        Ok(position.map(|i| state.shapes.remove(i).0))
    }
}

// ── Static process lookup ────────────────────────────────────────

/// A [`ProcessLookup`] answering from a fixed table.
#[derive(Debug, Clone, Default)]
pub struct StaticProcesses {
    default: Vec<TransactionProcess>,
    per_community: HashMap<CommunityId, Vec<TransactionProcess>>,
}

impl StaticProcesses {
    /// Every community reports `processes`.
    pub fn new(processes: Vec<TransactionProcess>) -> Self {
        Self {
            default: processes,
            per_community: HashMap::new(),
        }
    }

    /// Overrides the processes of one community.
    pub fn with_community(mut self, community_id: CommunityId, processes: Vec<TransactionProcess>) -> Self {
        self.per_community.insert(community_id, processes);
        self
    }
}

impl ProcessLookup for StaticProcesses {
    fn processes(&self, community_id: CommunityId) -> StoreResult<Vec<TransactionProcess>> {
        Ok(self
            .per_community
            .get(&community_id)
            .unwrap_or(&self.default)
            .clone())
    }
}

// ── In-memory listing directory ──────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct ListingRecord {
    shape_id: Option<ShapeId>,
    open: bool,
}

/// A [`ListingDirectory`] kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryListings {
    listings: Mutex<Vec<ListingRecord>>,
}

impl MemoryListings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listing using `shape_id`.
    pub fn add_listing(&self, shape_id: ShapeId, open: bool) -> StoreResult<()> {
        self.listings()?.push(ListingRecord {
            shape_id: Some(shape_id),
            open,
        });
        Ok(())
    }

    /// Listings still attached to `shape_id`, open or not.
    pub fn count_attached(&self, shape_id: ShapeId) -> StoreResult<u64> {
        Ok(self
            .listings()?
            .iter()
            .filter(|l| l.shape_id == Some(shape_id))
            .count() as u64)
    }

    fn listings(&self) -> StoreResult<MutexGuard<'_, Vec<ListingRecord>>> {
        self.listings
            .lock()
            .map_err(|_| StoreError::Database("listing directory lock poisoned".to_string()))
    }
}

impl ListingDirectory for MemoryListings {
    fn count_open_listings(&self, shape_id: ShapeId) -> StoreResult<u64> {
        Ok(self
            .listings()?
            .iter()
            .filter(|l| l.open && l.shape_id == Some(shape_id))
            .count() as u64)
    }

    fn close_listings(&self, shape_id: ShapeId, detach: bool) -> StoreResult<u64> {
        let mut touched = 0;
        for listing in self.listings()?.iter_mut() {
            if listing.shape_id != Some(shape_id) {
                continue;
            }
            listing.open = false;
            if detach {
                listing.shape_id = None;
            }
            touched += 1;
        }
        Ok(touched)
    }
}
