//! Leaf Items
//!
//! Applications and shortcuts exposed by the item catalog. The core only
//! ever references them by key; it never mutates them.

use serde::{Deserialize, Serialize};

use super::tag_item::{package_of, TagItemVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafKind {
    App,
    Shortcut,
}

/// Stable catalog address of a leaf item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeafKey {
    App { catalog_key: String },
    Shortcut { package: String, shortcut_id: String },
}

/// Opaque icon reference owned by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IconHandle(pub String);

/// An application or shortcut that can be launched directly
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeafItem {
    pub key: LeafKey,
    pub label: String,
    pub icon: Option<IconHandle>,
}

impl LeafItem {
    pub fn app(catalog_key: &str, label: &str) -> Self {
        Self {
            key: LeafKey::App {
                catalog_key: catalog_key.to_string(),
            },
            label: label.to_string(),
            icon: None,
        }
    }

    pub fn shortcut(package: &str, shortcut_id: &str, label: &str) -> Self {
        Self {
            key: LeafKey::Shortcut {
                package: package.to_string(),
                shortcut_id: shortcut_id.to_string(),
            },
            label: label.to_string(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(IconHandle(icon.to_string()));
        self
    }

    pub fn kind(&self) -> LeafKind {
        match self.key {
            LeafKey::App { .. } => LeafKind::App,
            LeafKey::Shortcut { .. } => LeafKind::Shortcut,
        }
    }

    pub fn package(&self) -> &str {
        match &self.key {
            LeafKey::App { catalog_key } => package_of(catalog_key),
            LeafKey::Shortcut { package, .. } => package,
        }
    }

    /// The record variant that references this item
    pub fn to_variant(&self) -> TagItemVariant {
        match &self.key {
            LeafKey::App { catalog_key } => TagItemVariant::App {
                catalog_key: catalog_key.clone(),
            },
            LeafKey::Shortcut {
                package,
                shortcut_id,
            } => TagItemVariant::Shortcut {
                package: package.clone(),
                shortcut_id: shortcut_id.clone(),
            },
        }
    }
}
