//! Tag Entity
//!
//! A tag is a named, ordered group of references that behaves like a folder.
//! Two tags are provisioned on first run with reserved ids.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// Reserved id of the Favorites tag
pub const FAVORITES_TAG_ID: u32 = 1;
/// Reserved id of the Pinned tag
pub const PINNED_TAG_ID: u32 = 2;

/// A user-visible group of launchable items
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier, stable once assigned
    pub id: u32,
    /// Display name
    pub name: String,
}

impl Tag {
    pub fn new(id: u32, name: String) -> Self {
        Self { id, name }
    }

    /// Whether this tag is one of the pre-provisioned system tags
    pub fn is_reserved(&self) -> bool {
        is_reserved_tag(self.id)
    }
}

pub fn is_reserved_tag(id: u32) -> bool {
    id == FAVORITES_TAG_ID || id == PINNED_TAG_ID
}

impl Entity for Tag {
    type Id = u32;
    const KIND: &'static str = "Tag";

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_creation() {
        let tag = Tag::new(5, "Work".to_string());
        assert_eq!(tag.id(), 5);
        assert_eq!(tag.name, "Work");
        assert!(!tag.is_reserved());
    }

    #[test]
    fn test_reserved_tags() {
        assert!(Tag::new(FAVORITES_TAG_ID, "Favorites".to_string()).is_reserved());
        assert!(is_reserved_tag(PINNED_TAG_ID));
        assert!(!is_reserved_tag(3));
    }
}
