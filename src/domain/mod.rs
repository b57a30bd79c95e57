//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO external dependencies (except serde for serialization).

mod entity;
mod leaf;
mod resolved;
mod snapshot;
mod tag;
mod tag_item;

pub use entity::{DomainError, DomainResult, Entity};
pub use leaf::{IconHandle, LeafItem, LeafKey, LeafKind};
pub use resolved::{ChildrenRef, ResolvedItem, UiRow};
pub use snapshot::StoreSnapshot;
pub use tag::{is_reserved_tag, Tag, FAVORITES_TAG_ID, PINNED_TAG_ID};
pub use tag_item::{package_of, TagItemRecord, TagItemVariant};
