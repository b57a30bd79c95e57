//! Tag Item Positioning Operations
//!
//! Every ordering mutation renumbers the tag's records to `0..n-1` inside a
//! single transaction, so readers never observe a partially reordered tag.

use async_trait::async_trait;
use rusqlite::{params, Connection};

use crate::domain::{DomainError, DomainResult, TagItemRecord, TagItemVariant};
use super::super::db::{not_open, write_error};
use super::tag_item_repo::{delete_record, insert_record, load_items};

/// Trait for ordering operations on a tag's records
#[async_trait]
pub trait TagItemPositioningOperations {
    /// Replace all records of a tag with `items`, numbered by list index
    async fn reorder(&self, tag_id: u32, items: &[TagItemRecord]) -> DomainResult<()>;

    /// Move the record at index `from` to index `to`
    async fn move_item(&self, tag_id: u32, from: usize, to: usize) -> DomainResult<()>;

    /// Append a record after the tag's current last one, returning it as stored
    async fn append(&self, record: &TagItemRecord) -> DomainResult<TagItemRecord>;

    /// Delete a record and close the gap it leaves
    async fn remove_and_compact(&self, record: &TagItemRecord) -> DomainResult<()>;

    /// Remove every record of `variant` from a tag, or append one if there is none
    ///
    /// Returns whether the tag holds the variant afterwards.
    async fn toggle_in_tag(&self, tag_id: u32, variant: &TagItemVariant) -> DomainResult<bool>;
}

#[async_trait]
impl TagItemPositioningOperations for super::tag_item_repo::TagItemRepository {
    async fn reorder(&self, tag_id: u32, items: &[TagItemRecord]) -> DomainResult<()> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_open)?;

        let changed = replace_items(conn, tag_id, items.to_vec())?;
        drop(guard);

        if changed {
            log::info!("Reordered tag {} ({} items)", tag_id, items.len());
            self.notifier.notify([tag_id]);
        }
        Ok(())
    }

    async fn move_item(&self, tag_id: u32, from: usize, to: usize) -> DomainResult<()> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_open)?;

        let mut items = load_items(conn, tag_id)?;
        if from >= items.len() || to >= items.len() {
            return Err(DomainError::InvalidInput(format!(
                "Cannot move item {} to {} in tag {} with {} items",
                from,
                to,
                tag_id,
                items.len()
            )));
        }

        let moving = items.remove(from);
        items.insert(to, moving);

        let changed = replace_items(conn, tag_id, items)?;
        drop(guard);

        if changed {
            self.notifier.notify([tag_id]);
        }
        Ok(())
    }

    async fn append(&self, record: &TagItemRecord) -> DomainResult<TagItemRecord> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_open)?;

        // Orders are kept dense, so this equals the current item count
        let order: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(item_order), -1) + 1 FROM tag_items WHERE tag_id = ?",
                params![record.tag_id],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut stored = record.clone();
        stored.order = order;
        insert_record(conn, &stored).map_err(write_error)?;
        drop(guard);

        self.notifier.notify([stored.tag_id]);
        Ok(stored)
    }

    async fn remove_and_compact(&self, record: &TagItemRecord) -> DomainResult<()> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_open)?;

        let tx = conn.transaction().map_err(|e| DomainError::Internal(e.to_string()))?;
        let removed = delete_record(&tx, record).map_err(write_error)?;
        if removed > 0 {
            let remaining = load_items(&tx, record.tag_id)?;
            renumber(&tx, record.tag_id, remaining)?;
        }
        tx.commit().map_err(|e| DomainError::Internal(e.to_string()))?;
        drop(guard);

        if removed > 0 {
            self.notifier.notify([record.tag_id]);
        }
        Ok(())
    }

    async fn toggle_in_tag(&self, tag_id: u32, variant: &TagItemVariant) -> DomainResult<bool> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_open)?;

        let tx = conn.transaction().map_err(|e| DomainError::Internal(e.to_string()))?;
        let items = load_items(&tx, tag_id)?;
        let (matching, remaining): (Vec<_>, Vec<_>) =
            items.into_iter().partition(|record| &record.variant == variant);

        let present = matching.is_empty();
        if present {
            let order = remaining.len() as i32;
            insert_record(&tx, &TagItemRecord::new(tag_id, order, variant.clone()))
                .map_err(write_error)?;
        } else {
            renumber(&tx, tag_id, remaining)?;
        }
        tx.commit().map_err(|e| DomainError::Internal(e.to_string()))?;
        drop(guard);

        self.notifier.notify([tag_id]);
        Ok(present)
    }
}

/// Transactionally replace the records of `tag_id` with `items`
///
/// Returns `false` without writing when the stored list already matches.
pub(super) fn replace_items(
    conn: &mut Connection,
    tag_id: u32,
    items: Vec<TagItemRecord>,
) -> DomainResult<bool> {
    let renumbered: Vec<TagItemRecord> = items
        .into_iter()
        .enumerate()
        .map(|(index, mut record)| {
            record.tag_id = tag_id;
            record.order = index as i32;
            record
        })
        .collect();

    let tx = conn.transaction().map_err(|e| DomainError::Internal(e.to_string()))?;

    if load_items(&tx, tag_id)? == renumbered {
        return Ok(false);
    }

    renumber(&tx, tag_id, renumbered)?;
    tx.commit().map_err(|e| DomainError::Internal(e.to_string()))?;
    Ok(true)
}

/// Rewrite all records of a tag with orders `0..n-1`; caller owns the transaction
fn renumber(conn: &Connection, tag_id: u32, items: Vec<TagItemRecord>) -> DomainResult<()> {
    // Clear first so the (tag_id, item_order) key cannot collide mid-rewrite
    conn.execute("DELETE FROM tag_items WHERE tag_id = ?", params![tag_id])
        .map_err(write_error)?;

    for (index, mut record) in items.into_iter().enumerate() {
        record.tag_id = tag_id;
        record.order = index as i32;
        insert_record(conn, &record).map_err(write_error)?;
    }
    Ok(())
}
