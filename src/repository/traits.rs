//! Repository Layer - Core Traits
//!
//! Persistence contract shared by the SQLite repositories. While the store
//! is closed every call fails with `DomainError::Unavailable`.

use async_trait::async_trait;
use crate::domain::{DomainError, DomainResult, Entity};

/// CRUD over one kind of entity
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Insert a new entity; the id of `entity` is ignored and the assigned one returned
    async fn create(&self, entity: &T) -> DomainResult<T>;

    async fn find_by_id(&self, id: T::Id) -> DomainResult<Option<T>>;

    /// Like `find_by_id`, but a missing entity is `NotFound`
    async fn require(&self, id: T::Id) -> DomainResult<T> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("{} {} not found", T::KIND, id)))
    }

    /// Every entity, ordered by id
    async fn list(&self) -> DomainResult<Vec<T>>;

    /// Overwrite an existing entity; `NotFound` when it does not exist
    async fn update(&self, entity: &T) -> DomainResult<T>;

    async fn delete(&self, id: T::Id) -> DomainResult<()>;
}
