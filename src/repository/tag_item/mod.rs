//! Tag Item Repository Module
//!
//! Ordered tag membership, split into specialized sub-modules:
//! - tag_item_repo: Core reads and writes of records
//! - tag_item_positioning: Ordering mutations (reorder, move, append, compacting removal)
//! - tag_item_promotion: The multi-step "promote item to its own tag" transaction

mod tag_item_repo;
mod tag_item_positioning;
mod tag_item_promotion;

pub use tag_item_repo::TagItemRepository;

// Re-export all operation traits so they can be used by importing TagItemRepository
pub use tag_item_positioning::TagItemPositioningOperations;
pub use tag_item_promotion::TagPromotionOperations;
