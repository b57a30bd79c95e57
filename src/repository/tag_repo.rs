//! Tag Repository
//!
//! SQLite-backed implementation for Tag CRUD. Deleting a tag cascades to
//! its records; references to it from other tags are left dangling.

use async_trait::async_trait;
use rusqlite::params;

use crate::domain::{is_reserved_tag, DomainError, DomainResult, Tag};
use super::db::{not_open, write_error, ChangeNotifier, SharedConnection};
use super::traits::Repository;

/// SQLite implementation of Tag repository
pub struct TagRepository {
    conn: SharedConnection,
    notifier: ChangeNotifier,
}

impl TagRepository {
    pub fn new(conn: SharedConnection, notifier: ChangeNotifier) -> Self {
        Self { conn, notifier }
    }
}

#[async_trait]
impl Repository<Tag> for TagRepository {
    async fn create(&self, entity: &Tag) -> DomainResult<Tag> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_open)?;

        conn.execute("INSERT INTO tags (name) VALUES (?)", params![entity.name])
            .map_err(write_error)?;

        let mut tag = entity.clone();
        tag.id = conn.last_insert_rowid() as u32;
        drop(guard);

        log::info!("Created tag {} '{}'", tag.id, tag.name);
        self.notifier.notify([tag.id]);
        Ok(tag)
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Tag>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_open)?;

        let mut stmt = conn
            .prepare("SELECT id, name FROM tags WHERE id = ?")
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut rows = stmt
            .query(params![id])
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        match rows.next().map_err(|e| DomainError::Internal(e.to_string()))? {
            Some(row) => Ok(Some(row_to_tag(row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> DomainResult<Vec<Tag>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_open)?;

        let mut stmt = conn
            .prepare("SELECT id, name FROM tags ORDER BY id")
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut rows = stmt
            .query([])
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut tags = Vec::new();
        while let Some(row) = rows.next().map_err(|e| DomainError::Internal(e.to_string()))? {
            tags.push(row_to_tag(row)?);
        }
        Ok(tags)
    }

    async fn update(&self, entity: &Tag) -> DomainResult<Tag> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_open)?;

        let changed = conn
            .execute(
                "UPDATE tags SET name = ? WHERE id = ?",
                params![entity.name, entity.id],
            )
            .map_err(write_error)?;
        drop(guard);

        if changed == 0 {
            return Err(DomainError::NotFound(format!("Tag {} not found", entity.id)));
        }

        self.notifier.notify([entity.id]);
        Ok(entity.clone())
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        if is_reserved_tag(id) {
            return Err(DomainError::InvalidInput(format!("Tag {} is reserved", id)));
        }

        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_open)?;

        // tag_items rows go with it through ON DELETE CASCADE
        let changed = conn
            .execute("DELETE FROM tags WHERE id = ?", params![id])
            .map_err(write_error)?;
        drop(guard);

        if changed == 0 {
            return Err(DomainError::NotFound(format!("Tag {} not found", id)));
        }

        log::info!("Deleted tag {}", id);
        self.notifier.notify([id]);
        Ok(())
    }
}

/// Convert a database row to Tag
pub(super) fn row_to_tag(row: &rusqlite::Row) -> DomainResult<Tag> {
    Ok(Tag {
        id: row.get(0).map_err(|e: rusqlite::Error| DomainError::Internal(e.to_string()))?,
        name: row.get(1).map_err(|e: rusqlite::Error| DomainError::Internal(e.to_string()))?,
    })
}
