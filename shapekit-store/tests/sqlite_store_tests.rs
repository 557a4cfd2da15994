use pretty_assertions::assert_eq;
use shapekit_engine::{
    ListingDirectory, MemoryShapeStore, NewShape, PriorityUpdate, ShapeConfig, ShapeService,
    ShapeStore, ShapeUpdate, StaticProcesses, StoreError,
};
use shapekit_model::{ShapeForm, ShapeInput, Unit, UnitType};
use shapekit_store::SqliteShapeStore;
use shapekit_types::{CategoryId, CommunityId, ProcessKind, ShapeId, TransactionProcess};
use std::collections::{BTreeMap, BTreeSet};

const COMMUNITY: CommunityId = CommunityId::new(1);
const OTHER: CommunityId = CommunityId::new(2);

fn rental_form() -> ShapeForm {
    ShapeForm {
        name: BTreeMap::from([
            ("en".to_string(), "Rent".to_string()),
            ("fi".to_string(), "Vuokraa".to_string()),
        ]),
        shipping_enabled: false,
        online_payments: true,
        price_enabled: true,
        units: vec![Unit::new(UnitType::Day), Unit::custom("units.per_wash")],
    }
}

fn new_shape(priority: i64) -> NewShape {
    NewShape {
        form: rental_form(),
        sort_priority: priority,
        categories: BTreeSet::from([CategoryId::new(3), CategoryId::new(4)]),
    }
}

fn ids(shapes: &[shapekit_model::Shape]) -> Vec<ShapeId> {
    shapes.iter().map(|s| s.id).collect()
}

// ── Shapes ───────────────────────────────────────────────────────

#[test]
fn create_then_get_roundtrips_form() {
    let store = SqliteShapeStore::open_in_memory().unwrap();
    let created = store.create(COMMUNITY, new_shape(2)).unwrap();

    let loaded = store.get(COMMUNITY, created.id, false).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.form(), rental_form());
    assert_eq!(loaded.sort_priority, 2);
    assert_eq!(loaded.categories, None);
}

#[test]
fn categories_are_loaded_on_request() {
    let store = SqliteShapeStore::open_in_memory().unwrap();
    let created = store.create(COMMUNITY, new_shape(0)).unwrap();
    let loaded = store.get(COMMUNITY, created.id, true).unwrap().unwrap();
    assert_eq!(
        loaded.categories,
        Some(BTreeSet::from([CategoryId::new(3), CategoryId::new(4)]))
    );
}

#[test]
fn lookups_are_scoped_to_community() {
    let store = SqliteShapeStore::open_in_memory().unwrap();
    let created = store.create(COMMUNITY, new_shape(0)).unwrap();
    assert!(store.get(OTHER, created.id, false).unwrap().is_none());
    assert!(store
        .update(OTHER, created.id, ShapeUpdate::SortPriority(5))
        .unwrap()
        .is_none());
    assert!(store.delete(OTHER, created.id).unwrap().is_none());
    assert!(store.get_all(OTHER, false).unwrap().is_empty());
}

#[test]
fn ids_beyond_sqlite_range_are_rejected() {
    let store = SqliteShapeStore::open_in_memory().unwrap();
    let created = store.create(COMMUNITY, new_shape(0)).unwrap();
    let huge = CommunityId::new(u64::MAX);

    assert!(matches!(
        store.get_all(huge, false),
        Err(StoreError::Database(msg)) if msg.contains("out of range")
    ));
    assert!(matches!(
        store.get(COMMUNITY, ShapeId::new(i64::MAX as u64 + 1), false),
        Err(StoreError::Database(_))
    ));
    assert!(matches!(store.create(huge, new_shape(1)), Err(StoreError::Database(_))));
    assert!(matches!(
        store.count_open_listings(ShapeId::new(u64::MAX)),
        Err(StoreError::Database(_))
    ));
    assert_eq!(ids(&store.get_all(COMMUNITY, false).unwrap()), vec![created.id]);
}

#[test]
fn get_all_orders_by_priority_then_id() {
    let store = SqliteShapeStore::open_in_memory().unwrap();
    let a = store.create(COMMUNITY, new_shape(3)).unwrap();
    let b = store.create(COMMUNITY, new_shape(1)).unwrap();
    let c = store.create(COMMUNITY, new_shape(3)).unwrap();
    assert_eq!(ids(&store.get_all(COMMUNITY, false).unwrap()), vec![b.id, a.id, c.id]);
}

#[test]
fn update_form_and_priority() {
    let store = SqliteShapeStore::open_in_memory().unwrap();
    let created = store.create(COMMUNITY, new_shape(0)).unwrap();

    let form = ShapeForm {
        price_enabled: false,
        online_payments: false,
        units: vec![],
        ..rental_form()
    };
    let updated = store
        .update(COMMUNITY, created.id, ShapeUpdate::Form(form.clone()))
        .unwrap()
        .unwrap();
    assert_eq!(updated.form(), form);

    let moved = store
        .update(COMMUNITY, created.id, ShapeUpdate::SortPriority(-4))
        .unwrap()
        .unwrap();
    assert_eq!(moved.sort_priority, -4);
    assert_eq!(moved.form(), form);
}

#[test]
fn apply_priorities_writes_all_updates() {
    let store = SqliteShapeStore::open_in_memory().unwrap();
    let a = store.create(COMMUNITY, new_shape(0)).unwrap();
    let b = store.create(COMMUNITY, new_shape(0)).unwrap();
    store
        .apply_priorities(
            COMMUNITY,
            &[
                PriorityUpdate { id: b.id, sort_priority: 0 },
                PriorityUpdate { id: a.id, sort_priority: 1 },
            ],
        )
        .unwrap();
    assert_eq!(ids(&store.get_all(COMMUNITY, false).unwrap()), vec![b.id, a.id]);
}

#[test]
fn delete_removes_shape_and_category_links() {
    let store = SqliteShapeStore::open_in_memory().unwrap();
    let created = store.create(COMMUNITY, new_shape(0)).unwrap();
    let deleted = store.delete(COMMUNITY, created.id).unwrap().unwrap();
    assert_eq!(deleted.id, created.id);
    assert!(store.get(COMMUNITY, created.id, true).unwrap().is_none());
}

#[test]
fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shapes.db");
    let path = path.to_str().unwrap();

    let created = {
        let store = SqliteShapeStore::open(path).unwrap();
        store.create(COMMUNITY, new_shape(7)).unwrap()
    };

    let reopened = SqliteShapeStore::open(path).unwrap();
    assert_eq!(reopened.get(COMMUNITY, created.id, false).unwrap(), Some(created));
}

// ── Listings ─────────────────────────────────────────────────────

#[test]
fn listing_count_and_close() {
    let store = SqliteShapeStore::open_in_memory().unwrap();
    let shape = store.create(COMMUNITY, new_shape(0)).unwrap();
    store.add_listing(shape.id, true).unwrap();
    store.add_listing(shape.id, true).unwrap();
    store.add_listing(shape.id, false).unwrap();

    assert_eq!(store.count_open_listings(shape.id).unwrap(), 2);
    assert_eq!(store.close_listings(shape.id, false).unwrap(), 3);
    assert_eq!(store.count_open_listings(shape.id).unwrap(), 0);
}

// ── With the service ─────────────────────────────────────────────

#[test]
fn service_reorder_over_sqlite() {
    let store = SqliteShapeStore::open_in_memory().unwrap();
    let service = ShapeService::new(
        store.clone(),
        StaticProcesses::new(vec![TransactionProcess::new(ProcessKind::Preauthorize)]),
        store,
        ShapeConfig::default(),
    );

    let shapes: Vec<ShapeId> = (0..3)
        .map(|_| service.create(COMMUNITY, ShapeInput::default()).unwrap().id)
        .collect();
    let desired = vec![shapes[2], shapes[1], shapes[0]];
    let diff = service.reorder(COMMUNITY, &desired).unwrap();
    assert_eq!(diff.len(), 2);
    assert_eq!(ids(&service.list(COMMUNITY, false).unwrap()), desired);
}

#[test]
fn sqlite_and_memory_stores_order_ties_alike() {
    let sqlite = SqliteShapeStore::open_in_memory().unwrap();
    let memory = MemoryShapeStore::new();
    for priority in [4, 1, 4, 1] {
        sqlite.create(COMMUNITY, new_shape(priority)).unwrap();
        memory.create(COMMUNITY, new_shape(priority)).unwrap();
    }
    assert_eq!(
        ids(&sqlite.get_all(COMMUNITY, false).unwrap()),
        ids(&memory.get_all(COMMUNITY, false).unwrap())
    );
}
