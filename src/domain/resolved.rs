//! Resolved Items
//!
//! Transient resolver output. Never persisted; recomputed whenever the
//! catalog or the tag store changes.

use serde::{Deserialize, Serialize};

use super::leaf::{IconHandle, LeafItem};
use super::tag::Tag;
use super::tag_item::TagItemRecord;

/// Handle to the children of a folder, resolved on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildrenRef(pub u32);

impl ChildrenRef {
    pub fn tag_id(&self) -> u32 {
        self.0
    }
}

/// What a record or a tag resolves to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolvedItem {
    Leaf(LeafItem),
    Folder {
        tag: Tag,
        /// Absent when the tag is empty or its first item dangles
        representative: Option<Box<ResolvedItem>>,
        children: ChildrenRef,
    },
    /// Following the reference would revisit a tag already on the current path
    Cycle,
}

impl ResolvedItem {
    pub fn folder(tag: Tag, representative: Option<ResolvedItem>) -> Self {
        let children = ChildrenRef(tag.id);
        ResolvedItem::Folder {
            tag,
            representative: representative.map(Box::new),
            children,
        }
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self, ResolvedItem::Cycle)
    }

    /// Display label; cycles render with the caller's cycle label
    pub fn label<'a>(&'a self, cycle_label: &'a str) -> &'a str {
        match self {
            ResolvedItem::Leaf(leaf) => &leaf.label,
            ResolvedItem::Folder {
                tag,
                representative,
                ..
            } => match representative {
                Some(rep) => rep.label(cycle_label),
                None => &tag.name,
            },
            ResolvedItem::Cycle => cycle_label,
        }
    }

    pub fn icon(&self) -> Option<&IconHandle> {
        match self {
            ResolvedItem::Leaf(leaf) => leaf.icon.as_ref(),
            ResolvedItem::Folder { representative, .. } => {
                representative.as_deref().and_then(ResolvedItem::icon)
            }
            ResolvedItem::Cycle => None,
        }
    }

    /// The leaf a tap on this item launches
    pub fn launch_target(&self) -> Option<&LeafItem> {
        match self {
            ResolvedItem::Leaf(leaf) => Some(leaf),
            ResolvedItem::Folder { representative, .. } => {
                representative.as_deref().and_then(ResolvedItem::launch_target)
            }
            ResolvedItem::Cycle => None,
        }
    }
}

/// One displayable row of a projection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UiRow {
    pub label: String,
    pub item: ResolvedItem,
    /// The stored record behind the row; `None` for rows taken straight from the catalog
    pub record: Option<TagItemRecord>,
}

impl UiRow {
    pub fn from_record(record: TagItemRecord, item: ResolvedItem, cycle_label: &str) -> Self {
        let label = record
            .label_override
            .clone()
            .unwrap_or_else(|| item.label(cycle_label).to_string());
        Self {
            label,
            item,
            record: Some(record),
        }
    }

    pub fn from_leaf(leaf: LeafItem) -> Self {
        Self {
            label: leaf.label.clone(),
            item: ResolvedItem::Leaf(leaf),
            record: None,
        }
    }
}
