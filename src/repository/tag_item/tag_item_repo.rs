//! Tag Item Repository - Core Operations
//!
//! SQLite-backed storage of ordered tag records. Writes use
//! `INSERT OR REPLACE`, so the latest write to a `(tag_id, order)` slot wins.

use rusqlite::{params, Connection};
use std::collections::{BTreeSet, HashMap};

use crate::domain::{
    package_of, DomainError, DomainResult, StoreSnapshot, TagItemRecord, TagItemVariant,
};
use super::super::db::{not_open, write_error, ChangeNotifier, SharedConnection};
use super::super::tag_repo::row_to_tag;

const RECORD_COLUMNS: &str =
    "tag_id, item_order, variant, package_key, shortcut_id, target_tag_id, label_override";

/// SQLite implementation of the ordered tag store
pub struct TagItemRepository {
    pub(super) conn: SharedConnection,
    pub(super) notifier: ChangeNotifier,
}

impl TagItemRepository {
    pub fn new(conn: SharedConnection, notifier: ChangeNotifier) -> Self {
        Self { conn, notifier }
    }

    /// Records of a tag ordered by `order`
    pub async fn items_for_tag(&self, tag_id: u32) -> DomainResult<Vec<TagItemRecord>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_open)?;
        load_items(conn, tag_id)
    }

    /// First record of a tag referring to `variant`, if any
    pub async fn find_by_variant(
        &self,
        tag_id: u32,
        variant: &TagItemVariant,
    ) -> DomainResult<Option<TagItemRecord>> {
        let items = self.items_for_tag(tag_id).await?;
        Ok(items.into_iter().find(|record| &record.variant == variant))
    }

    pub async fn insert(&self, record: &TagItemRecord) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_open)?;

        insert_record(conn, record).map_err(write_error)?;
        drop(guard);

        self.notifier.notify([record.tag_id]);
        Ok(())
    }

    /// Insert every record in one transaction
    pub async fn insert_all(&self, records: &[TagItemRecord]) -> DomainResult<()> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_open)?;

        let tx = conn.transaction().map_err(|e| DomainError::Internal(e.to_string()))?;
        for record in records {
            insert_record(&tx, record).map_err(write_error)?;
        }
        tx.commit().map_err(|e| DomainError::Internal(e.to_string()))?;
        drop(guard);

        self.notifier.notify(records.iter().map(|record| record.tag_id));
        Ok(())
    }

    /// Remove exactly this record; a record that is no longer stored is ignored
    pub async fn delete(&self, record: &TagItemRecord) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_open)?;

        let removed = delete_record(conn, record).map_err(write_error)?;
        drop(guard);

        if removed == 0 {
            log::debug!(
                "No record at tag {} order {} to delete",
                record.tag_id,
                record.order
            );
            return Ok(());
        }

        self.notifier.notify([record.tag_id]);
        Ok(())
    }

    /// Package keys referenced by any app or shortcut record across all tags
    pub async fn distinct_referenced_packages(&self) -> DomainResult<BTreeSet<String>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_open)?;

        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT package_key FROM tag_items
                 WHERE variant IN ('APP', 'SHORTCUT') AND package_key IS NOT NULL",
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut rows = stmt
            .query([])
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut packages = BTreeSet::new();
        while let Some(row) = rows.next().map_err(|e| DomainError::Internal(e.to_string()))? {
            let key: String = row.get(0).map_err(|e| DomainError::Internal(e.to_string()))?;
            packages.insert(package_of(&key).to_string());
        }
        Ok(packages)
    }

    /// Every tag and record, read under one lock
    pub async fn snapshot(&self) -> DomainResult<StoreSnapshot> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_open)?;

        let mut snapshot = StoreSnapshot::default();

        {
            let mut stmt = conn
                .prepare("SELECT id, name FROM tags")
                .map_err(|e| DomainError::Internal(e.to_string()))?;
            let mut rows = stmt
                .query([])
                .map_err(|e| DomainError::Internal(e.to_string()))?;
            while let Some(row) = rows.next().map_err(|e| DomainError::Internal(e.to_string()))? {
                let tag = row_to_tag(row)?;
                snapshot.tags.insert(tag.id, tag);
            }
        }

        let mut items: HashMap<u32, Vec<TagItemRecord>> = HashMap::new();
        {
            let sql = format!(
                "SELECT {} FROM tag_items ORDER BY tag_id, item_order",
                RECORD_COLUMNS
            );
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| DomainError::Internal(e.to_string()))?;
            let mut rows = stmt
                .query([])
                .map_err(|e| DomainError::Internal(e.to_string()))?;
            while let Some(row) = rows.next().map_err(|e| DomainError::Internal(e.to_string()))? {
                let record = row_to_record(row)?;
                items.entry(record.tag_id).or_default().push(record);
            }
        }
        snapshot.items = items;

        Ok(snapshot)
    }
}

pub(super) fn load_items(conn: &Connection, tag_id: u32) -> DomainResult<Vec<TagItemRecord>> {
    let sql = format!(
        "SELECT {} FROM tag_items WHERE tag_id = ? ORDER BY item_order",
        RECORD_COLUMNS
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| DomainError::Internal(e.to_string()))?;

    let mut rows = stmt
        .query(params![tag_id])
        .map_err(|e| DomainError::Internal(e.to_string()))?;

    let mut items = Vec::new();
    while let Some(row) = rows.next().map_err(|e| DomainError::Internal(e.to_string()))? {
        items.push(row_to_record(row)?);
    }
    Ok(items)
}

/// Persisted `(package_key, shortcut_id, target_tag_id)` columns of a variant
fn variant_columns(variant: &TagItemVariant) -> (Option<&str>, Option<&str>, Option<u32>) {
    match variant {
        TagItemVariant::App { catalog_key } => (Some(catalog_key), None, None),
        TagItemVariant::Shortcut {
            package,
            shortcut_id,
        } => (Some(package), Some(shortcut_id), None),
        TagItemVariant::Tag { target_tag_id } => (None, None, Some(*target_tag_id)),
    }
}

pub(super) fn insert_record(conn: &Connection, record: &TagItemRecord) -> rusqlite::Result<usize> {
    let (package_key, shortcut_id, target_tag_id) = variant_columns(&record.variant);
    conn.execute(
        "INSERT OR REPLACE INTO tag_items
            (tag_id, item_order, variant, package_key, shortcut_id, target_tag_id, label_override)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
            record.tag_id,
            record.order,
            record.variant.as_str(),
            package_key,
            shortcut_id,
            target_tag_id,
            record.label_override,
        ],
    )
}

pub(super) fn delete_record(conn: &Connection, record: &TagItemRecord) -> rusqlite::Result<usize> {
    let (package_key, shortcut_id, target_tag_id) = variant_columns(&record.variant);
    conn.execute(
        "DELETE FROM tag_items
         WHERE tag_id = ? AND item_order = ? AND variant = ?
           AND package_key IS ? AND shortcut_id IS ? AND target_tag_id IS ?",
        params![
            record.tag_id,
            record.order,
            record.variant.as_str(),
            package_key,
            shortcut_id,
            target_tag_id,
        ],
    )
}

/// Convert a database row to TagItemRecord
pub(super) fn row_to_record(row: &rusqlite::Row) -> DomainResult<TagItemRecord> {
    let get_err = |e: rusqlite::Error| DomainError::Internal(e.to_string());

    let kind: String = row.get(2).map_err(get_err)?;
    let variant = TagItemVariant::from_columns(
        &kind,
        row.get(3).map_err(get_err)?,
        row.get(4).map_err(get_err)?,
        row.get(5).map_err(get_err)?,
    )?;

    Ok(TagItemRecord {
        tag_id: row.get(0).map_err(get_err)?,
        order: row.get(1).map_err(get_err)?,
        variant,
        label_override: row.get(6).map_err(get_err)?,
    })
}
