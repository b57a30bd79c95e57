//! Database Connection and Setup
//!
//! Manages the SQLite connection, migrations and change notifications.

use rusqlite::{params, Connection, Transaction};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use crate::domain::{DomainError, DomainResult, FAVORITES_TAG_ID, PINNED_TAG_ID};
use super::tag_item::TagItemRepository;
use super::tag_repo::TagRepository;

pub const DEFAULT_FAVORITES_NAME: &str = "Favorites";
pub const DEFAULT_PINNED_NAME: &str = "Pinned";

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Connection shared by every repository; `None` while the store is closed
pub type SharedConnection = Arc<Mutex<Option<Connection>>>;

/// Emitted after every committed mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    /// Tags whose records (or whose own row) changed
    pub tag_ids: Vec<u32>,
}

/// Sender half used by repositories to publish committed changes
#[derive(Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<StoreChange>,
}

impl ChangeNotifier {
    pub fn notify(&self, tag_ids: impl IntoIterator<Item = u32>) {
        let tag_ids: Vec<u32> = tag_ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        if tag_ids.is_empty() {
            return;
        }
        // No receivers is fine: nobody is observing yet
        let _ = self.tx.send(StoreChange { tag_ids });
    }
}

/// Database state wrapper
#[derive(Clone)]
pub struct DbState {
    pub conn: SharedConnection,
    notifier: ChangeNotifier,
}

impl DbState {
    /// A closed store; every repository call fails with `Unavailable`
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            conn: Arc::new(Mutex::new(None)),
            notifier: ChangeNotifier { tx },
        }
    }

    /// Observe committed mutations
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.notifier.tx.subscribe()
    }

    pub fn tag_repo(&self) -> TagRepository {
        TagRepository::new(self.conn.clone(), self.notifier.clone())
    }

    pub fn tag_item_repo(&self) -> TagItemRepository {
        TagItemRepository::new(self.conn.clone(), self.notifier.clone())
    }

    /// Drop the connection; later calls fail with `Unavailable`
    pub async fn close(&self) {
        let mut guard = self.conn.lock().await;
        if guard.take().is_some() {
            log::info!("Tag store closed");
        }
    }
}

impl Default for DbState {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn not_open() -> DomainError {
    DomainError::Unavailable("Database not initialized".to_string())
}

/// Map a failed write, keeping constraint violations distinguishable
pub(crate) fn write_error(e: rusqlite::Error) -> DomainError {
    if e.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
        DomainError::Conflict(e.to_string())
    } else {
        DomainError::Internal(e.to_string())
    }
}

/// Initialize database with path, provisioning the reserved tags with their default names
pub async fn init_db(db_path: &Path) -> DomainResult<DbState> {
    open_db(db_path, DEFAULT_FAVORITES_NAME, DEFAULT_PINNED_NAME).await
}

/// Initialize database with path and reserved tag names
pub async fn open_db(db_path: &Path, favorites_name: &str, pinned_name: &str) -> DomainResult<DbState> {
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| DomainError::InvalidInput("Invalid DB path".to_string()))?;

    let mut conn = Connection::open(db_path_str)
        .map_err(|e| DomainError::Unavailable(format!("Failed to open db: {}", e)))?;

    run_migrations(&mut conn, favorites_name, pinned_name)?;

    let state = DbState::new();
    *state.conn.lock().await = Some(conn);

    log::info!("Tag store opened at {}", db_path_str);
    Ok(state)
}

/// Check if a table exists
fn table_exists(conn: &Connection, table: &str) -> bool {
    conn.query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?",
        params![table],
        |_| Ok(()),
    )
    .is_ok()
}

/// Run database migrations
fn run_migrations(conn: &mut Connection, favorites_name: &str, pinned_name: &str) -> DomainResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|e| DomainError::Internal(e.to_string()))?;

    let tx = conn.transaction().map_err(|e| DomainError::Internal(e.to_string()))?;

    tx.execute(
        "CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| DomainError::Internal(e.to_string()))?;

    tx.execute(
        "CREATE TABLE IF NOT EXISTS tag_items (
            tag_id INTEGER NOT NULL,
            item_order INTEGER NOT NULL,
            variant TEXT NOT NULL,
            package_key TEXT,
            shortcut_id TEXT,
            target_tag_id INTEGER,
            label_override TEXT,
            PRIMARY KEY (tag_id, item_order),
            FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
        )",
        [],
    )
    .map_err(|e| DomainError::Internal(e.to_string()))?;

    // Reverse lookup of the records that reference a tag
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_tag_items_target ON tag_items(target_tag_id)",
        [],
    )
    .map_err(|e| DomainError::Internal(e.to_string()))?;

    for (id, name) in [(FAVORITES_TAG_ID, favorites_name), (PINNED_TAG_ID, pinned_name)] {
        tx.execute(
            "INSERT OR IGNORE INTO tags (id, name) VALUES (?, ?)",
            params![id, name],
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;
    }

    migrate_legacy_tables(&tx)?;

    tx.commit().map_err(|e| DomainError::Internal(e.to_string()))?;
    Ok(())
}

/// Fold the old per-kind tables into `tag_items`
///
/// Apps are numbered first, then shortcuts, continuing after any records a
/// tag already has. Rows pointing at tags that no longer exist are dropped.
fn migrate_legacy_tables(tx: &Transaction<'_>) -> DomainResult<()> {
    let has_apps = table_exists(tx, "tagged_apps");
    let has_shortcuts = table_exists(tx, "tagged_shortcuts");
    if !has_apps && !has_shortcuts {
        return Ok(());
    }

    let mut next_order: HashMap<u32, i32> = HashMap::new();
    let mut take_order = |tx: &Transaction<'_>, tag_id: u32| -> DomainResult<i32> {
        if let Some(order) = next_order.get_mut(&tag_id) {
            let current = *order;
            *order += 1;
            return Ok(current);
        }
        let first: i32 = tx
            .query_row(
                "SELECT COALESCE(MAX(item_order), -1) + 1 FROM tag_items WHERE tag_id = ?",
                params![tag_id],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        next_order.insert(tag_id, first + 1);
        Ok(first)
    };

    let mut migrated = 0usize;

    if has_apps {
        let rows: Vec<(String, u32)> = {
            let mut stmt = tx
                .prepare("SELECT packageName, tagId FROM tagged_apps WHERE tagId IN (SELECT id FROM tags)")
                .map_err(|e| DomainError::Internal(e.to_string()))?;
            let mapped = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
                .map_err(|e| DomainError::Internal(e.to_string()))?;
            mapped
                .collect::<Result<_, _>>()
                .map_err(|e| DomainError::Internal(e.to_string()))?
        };

        for (package, tag_id) in rows {
            let order = take_order(tx, tag_id)?;
            tx.execute(
                "INSERT INTO tag_items (tag_id, item_order, variant, package_key) VALUES (?, ?, 'APP', ?)",
                params![tag_id, order, package],
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;
            migrated += 1;
        }
    }

    if has_shortcuts {
        let rows: Vec<(String, String, u32, Option<String>)> = {
            let mut stmt = tx
                .prepare(
                    "SELECT packageName, shortcutId, tagId, label FROM tagged_shortcuts
                     WHERE tagId IN (SELECT id FROM tags)",
                )
                .map_err(|e| DomainError::Internal(e.to_string()))?;
            let mapped = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))
                .map_err(|e| DomainError::Internal(e.to_string()))?;
            mapped
                .collect::<Result<_, _>>()
                .map_err(|e| DomainError::Internal(e.to_string()))?
        };

        for (package, shortcut_id, tag_id, label) in rows {
            let order = take_order(tx, tag_id)?;
            tx.execute(
                "INSERT INTO tag_items (tag_id, item_order, variant, package_key, shortcut_id, label_override)
                 VALUES (?, ?, 'SHORTCUT', ?, ?, ?)",
                params![tag_id, order, package, shortcut_id, label],
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;
            migrated += 1;
        }
    }

    tx.execute_batch("DROP TABLE IF EXISTS tagged_apps; DROP TABLE IF EXISTS tagged_shortcuts;")
        .map_err(|e| DomainError::Internal(e.to_string()))?;

    log::info!("Migrated {} legacy tag rows into tag_items", migrated);
    Ok(())
}
