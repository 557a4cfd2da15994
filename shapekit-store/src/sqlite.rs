use rusqlite::{params, Connection, OptionalExtension};
use shapekit_engine::{
    ListingDirectory, NewShape, PriorityUpdate, ShapeStore, ShapeUpdate, StoreError, StoreResult,
};
use shapekit_model::{Shape, Unit};
use shapekit_types::{CategoryId, CommunityId, ShapeId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const SHAPE_COLUMNS: &str = "id, community_id, name, sort_priority, shipping_enabled, online_payments, price_enabled, units";

/// Persistent shape store backed by SQLite.
#[derive(Clone)]
pub struct SqliteShapeStore {
    conn: Arc<Mutex<Connection>>,
}

/// Raw column values of one `listing_shapes` row.
struct ShapeRow {
    id: i64,
    community_id: i64,
    name: String,
    sort_priority: i64,
    shipping_enabled: bool,
    online_payments: bool,
    price_enabled: bool,
    units: String,
}

impl ShapeRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            community_id: row.get(1)?,
            name: row.get(2)?,
            sort_priority: row.get(3)?,
            shipping_enabled: row.get(4)?,
            online_payments: row.get(5)?,
            price_enabled: row.get(6)?,
            units: row.get(7)?,
        })
    }

    fn into_shape(self) -> StoreResult<Shape> {
        let name: BTreeMap<String, String> = serde_json::from_str(&self.name)?;
        let units: Vec<Unit> = serde_json::from_str(&self.units)?;
        Ok(Shape {
            id: ShapeId::new(row_id(self.id)?),
            community_id: CommunityId::new(row_id(self.community_id)?),
            name,
            sort_priority: self.sort_priority,
            shipping_enabled: self.shipping_enabled,
            online_payments: self.online_payments,
            price_enabled: self.price_enabled,
            units,
            categories: None,
        })
    }
}

fn db_err(context: &str) -> impl Fn(rusqlite::Error) -> StoreError + '_ {
    move |e| StoreError::Database(format!("{context}: {e}"))
}

/// Ids are stored as SQLite integers, which are signed.
fn sql_id(raw: u64) -> StoreResult<i64> {
    i64::try_from(raw).map_err(|_| StoreError::Database(format!("id {raw} is out of range")))
}

fn row_id(raw: i64) -> StoreResult<u64> {
    u64::try_from(raw).map_err(|_| StoreError::Database(format!("stored id {raw} is negative")))
}

impl SqliteShapeStore {
    /// Opens (or creates) a shape store at the given path.
    pub fn open(path: &str) -> StoreResult<Self> {
        let conn = Connection::open(path).map_err(db_err("failed to open shape store"))?;
        Self::with_connection(conn)
    }

    /// Opens an in-memory shape store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(db_err("failed to open in-memory shape store"))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("shape store lock poisoned".to_string()))
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS listing_shapes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                community_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                sort_priority INTEGER NOT NULL,
                shipping_enabled INTEGER NOT NULL,
                online_payments INTEGER NOT NULL,
                price_enabled INTEGER NOT NULL,
                units TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS listing_shapes_by_community
                ON listing_shapes (community_id, sort_priority);

            CREATE TABLE IF NOT EXISTS category_listing_shapes (
                category_id INTEGER NOT NULL,
                listing_shape_id INTEGER NOT NULL,
                UNIQUE(category_id, listing_shape_id)
            );

            CREATE TABLE IF NOT EXISTS listings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                listing_shape_id INTEGER,
                open INTEGER NOT NULL DEFAULT 1
            );
            ",
        )
        .map_err(db_err("failed to init shape schema"))?;
        Ok(())
    }

    // ── Listings ─────────────────────────────────────────────────

    /// Registers a listing using `shape_id`.
    pub fn add_listing(&self, shape_id: ShapeId, open: bool) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO listings (listing_shape_id, open) VALUES (?1, ?2)",
            params![sql_id(shape_id.get())?, open],
        )
        .map_err(db_err("failed to insert listing"))?;
        Ok(())
    }

    // ── Helpers ──────────────────────────────────────────────────

    fn load_categories(conn: &Connection, shape_id: i64) -> StoreResult<BTreeSet<CategoryId>> {
        let mut stmt = conn
            .prepare("SELECT category_id FROM category_listing_shapes WHERE listing_shape_id = ?1")
            .map_err(db_err("failed to prepare category query"))?;
        let rows = stmt
            .query_map(params![shape_id], |row| row.get::<_, i64>(0))
            .map_err(db_err("failed to query categories"))?;

        let mut categories = BTreeSet::new();
        for row in rows {
            let id = row.map_err(db_err("failed to read category row"))?;
            categories.insert(CategoryId::new(row_id(id)?));
        }
        Ok(categories)
    }

    fn find(
        conn: &Connection,
        community_id: CommunityId,
        shape_id: ShapeId,
        include_categories: bool,
    ) -> StoreResult<Option<Shape>> {
        let row = conn
            .query_row(
                &format!("SELECT {SHAPE_COLUMNS} FROM listing_shapes WHERE id = ?1 AND community_id = ?2"),
                params![sql_id(shape_id.get())?, sql_id(community_id.get())?],
                ShapeRow::from_row,
            )
            .optional()
            .map_err(db_err("failed to query shape"))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let id = row.id;
        let mut shape = row.into_shape()?;
        if include_categories {
            shape.categories = Some(Self::load_categories(conn, id)?);
        }
        Ok(Some(shape))
    }
}

impl ShapeStore for SqliteShapeStore {
    fn get(
        &self,
        community_id: CommunityId,
        shape_id: ShapeId,
        include_categories: bool,
    ) -> StoreResult<Option<Shape>> {
        let conn = self.conn()?;
        Self::find(&conn, community_id, shape_id, include_categories)
    }

    fn get_all(&self, community_id: CommunityId, include_categories: bool) -> StoreResult<Vec<Shape>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SHAPE_COLUMNS} FROM listing_shapes WHERE community_id = ?1 ORDER BY sort_priority ASC, id ASC"
            ))
            .map_err(db_err("failed to prepare shape query"))?;
        let rows = stmt
            .query_map(params![sql_id(community_id.get())?], ShapeRow::from_row)
            .map_err(db_err("failed to query shapes"))?;

        let mut shapes = Vec::new();
        for row in rows {
            let row = row.map_err(db_err("failed to read shape row"))?;
            let id = row.id;
            let mut shape = row.into_shape()?;
            if include_categories {
                shape.categories = Some(Self::load_categories(&conn, id)?);
            }
            shapes.push(shape);
        }
        Ok(shapes)
    }

    fn create(&self, community_id: CommunityId, shape: NewShape) -> StoreResult<Shape> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(db_err("failed to begin transaction"))?;

        tx.execute(
            "INSERT INTO listing_shapes (community_id, name, sort_priority, shipping_enabled, online_payments, price_enabled, units)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                sql_id(community_id.get())?,
                serde_json::to_string(&shape.form.name)?,
                shape.sort_priority,
                shape.form.shipping_enabled,
                shape.form.online_payments,
                shape.form.price_enabled,
                serde_json::to_string(&shape.form.units)?,
            ],
        )
        .map_err(db_err("failed to insert shape"))?;
        let id = tx.last_insert_rowid();

        for category in &shape.categories {
            tx.execute(
                "INSERT OR IGNORE INTO category_listing_shapes (category_id, listing_shape_id) VALUES (?1, ?2)",
                params![sql_id(category.get())?, id],
            )
            .map_err(db_err("failed to link category"))?;
        }
        tx.commit().map_err(db_err("failed to commit shape"))?;

        Self::find(&conn, community_id, ShapeId::new(row_id(id)?), false)?
            .ok_or_else(|| StoreError::Database(format!("shape {id} vanished after insert")))
    }

    fn update(
        &self,
        community_id: CommunityId,
        shape_id: ShapeId,
        update: ShapeUpdate,
    ) -> StoreResult<Option<Shape>> {
        let conn = self.conn()?;
        let id = sql_id(shape_id.get())?;
        let community = sql_id(community_id.get())?;

        let changed = match update {
            ShapeUpdate::Form(form) => conn.execute(
                "UPDATE listing_shapes
                 SET name = ?1, shipping_enabled = ?2, online_payments = ?3, price_enabled = ?4, units = ?5
                 WHERE id = ?6 AND community_id = ?7",
                params![
                    serde_json::to_string(&form.name)?,
                    form.shipping_enabled,
                    form.online_payments,
                    form.price_enabled,
                    serde_json::to_string(&form.units)?,
                    id,
                    community,
                ],
            ),
            ShapeUpdate::SortPriority(priority) => conn.execute(
                "UPDATE listing_shapes SET sort_priority = ?1 WHERE id = ?2 AND community_id = ?3",
                params![priority, id, community],
            ),
        }
        .map_err(db_err("failed to update shape"))?;

        if changed == 0 {
            return Ok(None);
        }
        Self::find(&conn, community_id, shape_id, false)
    }

    fn delete(&self, community_id: CommunityId, shape_id: ShapeId) -> StoreResult<Option<Shape>> {
        let mut conn = self.conn()?;
        let Some(shape) = Self::find(&conn, community_id, shape_id, false)? else {
            return Ok(None);
        };

        let tx = conn
            .transaction()
            .map_err(db_err("failed to begin transaction"))?;
        tx.execute(
            "DELETE FROM category_listing_shapes WHERE listing_shape_id = ?1",
            params![sql_id(shape_id.get())?],
        )
        .map_err(db_err("failed to unlink categories"))?;
        tx.execute(
            "DELETE FROM listing_shapes WHERE id = ?1 AND community_id = ?2",
            params![sql_id(shape_id.get())?, sql_id(community_id.get())?],
        )
        .map_err(db_err("failed to delete shape"))?;
        tx.commit().map_err(db_err("failed to commit delete"))?;
        Ok(Some(shape))
    }

    fn apply_priorities(
        &self,
        community_id: CommunityId,
        updates: &[PriorityUpdate],
    ) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(db_err("failed to begin transaction"))?;
        for update in updates {
            tx.execute(
                "UPDATE listing_shapes SET sort_priority = ?1 WHERE id = ?2 AND community_id = ?3",
                params![
                    update.sort_priority,
                    sql_id(update.id.get())?,
                    sql_id(community_id.get())?
                ],
            )
            .map_err(db_err("failed to update sort priority"))?;
        }
        tx.commit().map_err(db_err("failed to commit reorder"))?;
        debug!(community_id = %community_id, changed = updates.len(), "Applied shape priorities");
        Ok(())
    }
}

impl ListingDirectory for SqliteShapeStore {
    fn count_open_listings(&self, shape_id: ShapeId) -> StoreResult<u64> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM listings WHERE listing_shape_id = ?1 AND open = 1",
                params![sql_id(shape_id.get())?],
                |row| row.get(0),
            )
            .map_err(db_err("failed to count listings"))?;
        Ok(count as u64)
    }

    fn close_listings(&self, shape_id: ShapeId, detach: bool) -> StoreResult<u64> {
        let conn = self.conn()?;
        let sql = if detach {
            "UPDATE listings SET open = 0, listing_shape_id = NULL WHERE listing_shape_id = ?1"
        } else {
            "UPDATE listings SET open = 0 WHERE listing_shape_id = ?1"
        };
        let touched = conn
            .execute(sql, params![sql_id(shape_id.get())?])
            .map_err(db_err("failed to close listings"))?;
        Ok(touched as u64)
    }
}
