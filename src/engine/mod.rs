//! Engine Layer
//!
//! Resolution of the tag graph and everything derived from it:
//! - resolver: representatives and children, with cycle detection
//! - projector: the row lists the launcher renders
//! - actions: context actions for a row
//! - shortcut_cache: per-package shortcut fetches
//! - tag_engine: the reactive facade tying them to the store and catalog

mod actions;
mod projector;
mod resolver;
mod shortcut_cache;
mod tag_engine;


pub use actions::{build_actions, is_favorite, Action, ActionEffect, ActionOutcome};
pub use projector::{all_items_index, popup_source, project_rows, sort_key, IndexGroup, RowSource};
pub use resolver::{CatalogView, Dependencies, ResolutionPass};
pub use shortcut_cache::ShortcutCache;
pub use tag_engine::{EngineStats, TagEngine};
