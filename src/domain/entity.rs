//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for persisted entities.

use serde::{Deserialize, Serialize};

/// Core trait for all persisted domain entities
pub trait Entity: Sized + Send + Sync + Clone + 'static {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + std::hash::Hash + std::fmt::Display + Send + Sync + 'static;

    /// Name used in error messages, e.g. "Tag"
    const KIND: &'static str;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
///
/// Dangling references and cycles are not errors; they resolve to
/// absent slots and `ResolvedItem::Cycle` respectively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainError {
    NotFound(String),
    InvalidInput(String),
    Conflict(String),
    /// The store is not open (not yet initialized, or closed)
    Unavailable(String),
    Internal(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            DomainError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            DomainError::Unavailable(msg) => write!(f, "Store unavailable: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
