//! Context Action Builder
//!
//! Lists what a long-press on a row can do. Building is pure; the engine
//! carries the effects out (`TagEngine::perform`).

use serde::{Deserialize, Serialize};

use crate::domain::{
    LeafItem, LeafKey, ResolvedItem, TagItemRecord, TagItemVariant, UiRow, FAVORITES_TAG_ID,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionEffect {
    /// Add the leaf to Favorites, or remove it
    ToggleFavorite(LeafItem),
    /// Navigate to the management view of a tag
    EditTag(u32),
    /// Replace the record with a tag holding it (and its app's shortcuts)
    PromoteToTag(TagItemRecord),
    OpenSettings(LeafItem),
    Uninstall(LeafItem),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub label: String,
    pub effect: ActionEffect,
}

impl Action {
    fn new(label: &str, effect: ActionEffect) -> Self {
        Self {
            label: label.to_string(),
            effect,
        }
    }
}

/// Result of performing an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Done,
    /// The caller should open the management view of this tag
    OpenTag(u32),
}

/// Actions for `row`, given the current records of the Favorites tag
///
/// The row's record (if any) identifies the parent tag.
pub fn build_actions(row: &UiRow, favorites: &[TagItemRecord]) -> Vec<Action> {
    let mut actions = Vec::new();
    let parent = row.record.as_ref().map(|record| record.tag_id);

    if let ResolvedItem::Leaf(leaf) = &row.item {
        let label = if is_favorite(favorites, &leaf.to_variant()) {
            "Remove from favorites"
        } else {
            "Add to favorites"
        };
        actions.push(Action::new(label, ActionEffect::ToggleFavorite(leaf.clone())));
    }

    if parent == Some(FAVORITES_TAG_ID) {
        actions.push(Action::new("Edit favorites", ActionEffect::EditTag(FAVORITES_TAG_ID)));
    }

    // Cycles still carry their record, so the loop can be fixed from here
    let target = match (&row.item, &row.record) {
        (ResolvedItem::Folder { tag, .. }, _) => Some(tag.id),
        (_, Some(record)) => record.variant.target_tag_id(),
        _ => None,
    };
    if let Some(tag_id) = target {
        actions.push(Action::new("Edit tag", ActionEffect::EditTag(tag_id)));
    }

    if let Some(record) = row.record.as_ref().filter(|record| record.variant.is_leaf_ref()) {
        actions.push(Action::new(
            "Promote to tag",
            ActionEffect::PromoteToTag(record.clone()),
        ));
    }

    if let ResolvedItem::Leaf(leaf) = &row.item {
        actions.push(Action::new("App info", ActionEffect::OpenSettings(leaf.clone())));
        if matches!(leaf.key, LeafKey::App { .. }) {
            actions.push(Action::new("Uninstall", ActionEffect::Uninstall(leaf.clone())));
        }
    }

    actions
}

/// Whether `favorites` already holds a record for `variant`
pub fn is_favorite(favorites: &[TagItemRecord], variant: &TagItemVariant) -> bool {
    favorites.iter().any(|record| &record.variant == variant)
}
