//! Repository Layer
//!
//! Data access abstractions and the SQLite-backed ordered tag store.

mod traits;
mod db;
mod tag_repo;
pub mod tag_item;

#[cfg(test)]
mod tests;

pub use traits::Repository;
pub use db::{
    init_db, open_db, ChangeNotifier, DbState, SharedConnection, StoreChange,
    DEFAULT_FAVORITES_NAME, DEFAULT_PINNED_NAME,
};
pub use tag_repo::TagRepository;
pub use tag_item::{TagItemPositioningOperations, TagItemRepository, TagPromotionOperations};
