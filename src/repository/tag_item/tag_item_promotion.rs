//! Tag Promotion Operations
//!
//! Turns a single app or shortcut record into a tag of its own, in place.

use async_trait::async_trait;
use rusqlite::params;

use crate::domain::{DomainError, DomainResult, TagItemRecord, TagItemVariant};
use super::super::db::{not_open, write_error};
use super::tag_item_repo::{insert_record, load_items};

/// Trait for the promote-to-tag transaction
#[async_trait]
pub trait TagPromotionOperations {
    /// Promote `record` to a new tag named `name`
    ///
    /// The new tag holds the original item at order 0 followed by `extra_members`;
    /// the original slot in the parent tag becomes a reference to the new tag.
    /// A record that already references a tag returns its target unchanged.
    async fn promote_to_tag(
        &self,
        record: &TagItemRecord,
        name: &str,
        extra_members: &[TagItemVariant],
    ) -> DomainResult<u32>;
}

#[async_trait]
impl TagPromotionOperations for super::tag_item_repo::TagItemRepository {
    async fn promote_to_tag(
        &self,
        record: &TagItemRecord,
        name: &str,
        extra_members: &[TagItemVariant],
    ) -> DomainResult<u32> {
        if let TagItemVariant::Tag { target_tag_id } = record.variant {
            return Ok(target_tag_id);
        }

        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_open)?;

        let tx = conn.transaction().map_err(|e| DomainError::Internal(e.to_string()))?;

        // The slot must still hold this exact item
        let still_there = load_items(&tx, record.tag_id)?
            .into_iter()
            .any(|stored| stored.order == record.order && stored.variant == record.variant);
        if !still_there {
            return Err(DomainError::Conflict(format!(
                "Tag {} no longer holds this item at order {}",
                record.tag_id, record.order
            )));
        }

        tx.execute("INSERT INTO tags (name) VALUES (?)", params![name])
            .map_err(write_error)?;
        let new_tag_id = tx.last_insert_rowid() as u32;

        let mut first = record.clone();
        first.tag_id = new_tag_id;
        first.order = 0;
        insert_record(&tx, &first).map_err(write_error)?;

        for (index, variant) in extra_members.iter().enumerate() {
            let member = TagItemRecord::new(new_tag_id, index as i32 + 1, variant.clone());
            insert_record(&tx, &member).map_err(write_error)?;
        }

        let mut replacement = TagItemRecord::tag_ref(record.tag_id, record.order, new_tag_id);
        replacement.label_override = record.label_override.clone();
        insert_record(&tx, &replacement).map_err(write_error)?;

        tx.commit().map_err(|e| DomainError::Internal(e.to_string()))?;
        drop(guard);

        log::info!(
            "Promoted item at tag {} order {} to tag {} ({} members)",
            record.tag_id,
            record.order,
            new_tag_id,
            extra_members.len() + 1
        );
        self.notifier.notify([record.tag_id, new_tag_id]);
        Ok(new_tag_id)
    }
}
