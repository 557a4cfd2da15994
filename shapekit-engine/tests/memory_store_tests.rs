use pretty_assertions::assert_eq;
use shapekit_engine::{
    ListingDirectory, MemoryListings, MemoryShapeStore, NewShape, PriorityUpdate, ProcessLookup,
    ShapeStore, ShapeUpdate, StaticProcesses,
};
use shapekit_model::ShapeForm;
use shapekit_types::{CategoryId, CommunityId, ProcessKind, ShapeId, TransactionProcess};
use std::collections::BTreeSet;

const COMMUNITY: CommunityId = CommunityId::new(1);
const OTHER: CommunityId = CommunityId::new(2);

fn new_shape(priority: i64) -> NewShape {
    NewShape {
        form: ShapeForm::default(),
        sort_priority: priority,
        categories: BTreeSet::from([CategoryId::new(7)]),
    }
}

// ── MemoryShapeStore ─────────────────────────────────────────────

#[test]
fn create_assigns_fresh_ids() {
    let store = MemoryShapeStore::new();
    let a = store.create(COMMUNITY, new_shape(0)).unwrap();
    let b = store.create(COMMUNITY, new_shape(1)).unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(a.community_id, COMMUNITY);
}

#[test]
fn get_is_scoped_to_community() {
    let store = MemoryShapeStore::new();
    let shape = store.create(COMMUNITY, new_shape(0)).unwrap();
    assert!(store.get(COMMUNITY, shape.id, false).unwrap().is_some());
    assert!(store.get(OTHER, shape.id, false).unwrap().is_none());
    assert!(store.get(COMMUNITY, ShapeId::new(999), false).unwrap().is_none());
}

#[test]
fn categories_only_when_requested() {
    let store = MemoryShapeStore::new();
    let shape = store.create(COMMUNITY, new_shape(0)).unwrap();
    assert_eq!(store.get(COMMUNITY, shape.id, false).unwrap().unwrap().categories, None);
    assert_eq!(
        store.get(COMMUNITY, shape.id, true).unwrap().unwrap().categories,
        Some(BTreeSet::from([CategoryId::new(7)]))
    );
}

#[test]
fn get_all_orders_by_priority_and_keeps_ties_stable() {
    let store = MemoryShapeStore::new();
    let a = store.create(COMMUNITY, new_shape(5)).unwrap();
    let b = store.create(COMMUNITY, new_shape(1)).unwrap();
    let c = store.create(COMMUNITY, new_shape(5)).unwrap();
    store.create(OTHER, new_shape(0)).unwrap();

    let order: Vec<ShapeId> = store
        .get_all(COMMUNITY, false)
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(order, vec![b.id, a.id, c.id]);
}

#[test]
fn update_unknown_shape_returns_none() {
    let store = MemoryShapeStore::new();
    let result = store
        .update(COMMUNITY, ShapeId::new(3), ShapeUpdate::SortPriority(1))
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn update_form_keeps_priority() {
    let store = MemoryShapeStore::new();
    let shape = store.create(COMMUNITY, new_shape(4)).unwrap();
    let form = ShapeForm {
        price_enabled: true,
        ..Default::default()
    };
    let updated = store
        .update(COMMUNITY, shape.id, ShapeUpdate::Form(form))
        .unwrap()
        .unwrap();
    assert!(updated.price_enabled);
    assert_eq!(updated.sort_priority, 4);
}

#[test]
fn apply_priorities_skips_vanished_shapes() {
    let store = MemoryShapeStore::new();
    let shape = store.create(COMMUNITY, new_shape(0)).unwrap();
    store
        .apply_priorities(
            COMMUNITY,
            &[
                PriorityUpdate { id: shape.id, sort_priority: 9 },
                PriorityUpdate { id: ShapeId::new(77), sort_priority: 10 },
            ],
        )
        .unwrap();
    assert_eq!(store.get(COMMUNITY, shape.id, false).unwrap().unwrap().sort_priority, 9);
}

#[test]
fn delete_returns_removed_shape() {
    let store = MemoryShapeStore::new();
    let shape = store.create(COMMUNITY, new_shape(0)).unwrap();
    assert!(store.delete(OTHER, shape.id).unwrap().is_none());
    assert_eq!(store.delete(COMMUNITY, shape.id).unwrap().unwrap().id, shape.id);
    assert!(store.get_all(COMMUNITY, false).unwrap().is_empty());
}

// ── StaticProcesses ──────────────────────────────────────────────

#[test]
fn static_processes_per_community_override() {
    let lookup = StaticProcesses::new(vec![TransactionProcess::new(ProcessKind::None)])
        .with_community(OTHER, vec![TransactionProcess::new(ProcessKind::Preauthorize)]);
    assert_eq!(
        lookup.processes(COMMUNITY).unwrap(),
        vec![TransactionProcess::new(ProcessKind::None)]
    );
    assert_eq!(
        lookup.processes(OTHER).unwrap(),
        vec![TransactionProcess::new(ProcessKind::Preauthorize)]
    );
}

// ── MemoryListings ───────────────────────────────────────────────

#[test]
fn listing_counts_and_close() {
    let listings = MemoryListings::new();
    let shape = ShapeId::new(1);
    listings.add_listing(shape, true).unwrap();
    listings.add_listing(shape, true).unwrap();
    listings.add_listing(shape, false).unwrap();
    listings.add_listing(ShapeId::new(2), true).unwrap();

    assert_eq!(listings.count_open_listings(shape).unwrap(), 2);
    assert_eq!(listings.close_listings(shape, false).unwrap(), 3);
    assert_eq!(listings.count_open_listings(shape).unwrap(), 0);
    assert_eq!(listings.count_attached(shape).unwrap(), 3);
    assert_eq!(listings.count_open_listings(ShapeId::new(2)).unwrap(), 1);
}

#[test]
fn close_with_detach_unlinks_listings() {
    let listings = MemoryListings::new();
    let shape = ShapeId::new(1);
    listings.add_listing(shape, true).unwrap();
    assert_eq!(listings.close_listings(shape, true).unwrap(), 1);
    assert_eq!(listings.count_attached(shape).unwrap(), 0);
}
