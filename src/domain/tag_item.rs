//! Tag Item Records
//!
//! One ordered entry inside a tag. A record names either a leaf item of the
//! catalog or another tag; a tag reference may point anywhere, including
//! back at its own tag.

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult};

/// What a tag item record refers to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TagItemVariant {
    /// An application, by catalog key (`package` or `package/activity`)
    App { catalog_key: String },
    /// A shortcut published by a package
    Shortcut { package: String, shortcut_id: String },
    /// Another tag
    Tag { target_tag_id: u32 },
}

impl TagItemVariant {
    /// Value stored in the `variant` column
    pub fn as_str(&self) -> &'static str {
        match self {
            TagItemVariant::App { .. } => "APP",
            TagItemVariant::Shortcut { .. } => "SHORTCUT",
            TagItemVariant::Tag { .. } => "TAG",
        }
    }

    /// Rebuild a variant from its persisted columns
    pub fn from_columns(
        kind: &str,
        package_key: Option<String>,
        shortcut_id: Option<String>,
        target_tag_id: Option<u32>,
    ) -> DomainResult<Self> {
        let missing = |column: &str| {
            DomainError::Internal(format!("{} record without {}", kind, column))
        };
        match kind {
            "APP" => Ok(TagItemVariant::App {
                catalog_key: package_key.ok_or_else(|| missing("package_key"))?,
            }),
            "SHORTCUT" => Ok(TagItemVariant::Shortcut {
                package: package_key.ok_or_else(|| missing("package_key"))?,
                shortcut_id: shortcut_id.ok_or_else(|| missing("shortcut_id"))?,
            }),
            "TAG" => Ok(TagItemVariant::Tag {
                target_tag_id: target_tag_id.ok_or_else(|| missing("target_tag_id"))?,
            }),
            other => Err(DomainError::Internal(format!("Unknown tag item variant '{}'", other))),
        }
    }

    /// Package whose catalog entries this variant depends on
    pub fn package_key(&self) -> Option<&str> {
        match self {
            TagItemVariant::App { catalog_key } => Some(package_of(catalog_key)),
            TagItemVariant::Shortcut { package, .. } => Some(package),
            TagItemVariant::Tag { .. } => None,
        }
    }

    pub fn target_tag_id(&self) -> Option<u32> {
        match self {
            TagItemVariant::Tag { target_tag_id } => Some(*target_tag_id),
            _ => None,
        }
    }

    /// True for app and shortcut references
    pub fn is_leaf_ref(&self) -> bool {
        !matches!(self, TagItemVariant::Tag { .. })
    }
}

/// Package part of an app catalog key
pub fn package_of(catalog_key: &str) -> &str {
    catalog_key.split('/').next().unwrap_or(catalog_key)
}

/// A single ordered entry of a tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagItemRecord {
    /// Owning tag
    pub tag_id: u32,
    /// Position inside the owning tag, unique per tag
    pub order: i32,
    pub variant: TagItemVariant,
    /// Display label used instead of the referenced item's own label
    pub label_override: Option<String>,
}

impl TagItemRecord {
    pub fn new(tag_id: u32, order: i32, variant: TagItemVariant) -> Self {
        Self {
            tag_id,
            order,
            variant,
            label_override: None,
        }
    }

    pub fn app_ref(tag_id: u32, order: i32, catalog_key: &str) -> Self {
        Self::new(
            tag_id,
            order,
            TagItemVariant::App {
                catalog_key: catalog_key.to_string(),
            },
        )
    }

    pub fn shortcut_ref(tag_id: u32, order: i32, package: &str, shortcut_id: &str) -> Self {
        Self::new(
            tag_id,
            order,
            TagItemVariant::Shortcut {
                package: package.to_string(),
                shortcut_id: shortcut_id.to_string(),
            },
        )
    }

    pub fn tag_ref(tag_id: u32, order: i32, target_tag_id: u32) -> Self {
        Self::new(tag_id, order, TagItemVariant::Tag { target_tag_id })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label_override = Some(label.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creation() {
        let record = TagItemRecord::app_ref(1, 0, "com.example.app").with_label("Override");
        assert_eq!(record.tag_id, 1);
        assert_eq!(record.order, 0);
        assert_eq!(record.variant.as_str(), "APP");
        assert_eq!(record.variant.package_key(), Some("com.example.app"));
        assert_eq!(record.variant.target_tag_id(), None);
        assert_eq!(record.label_override.as_deref(), Some("Override"));
    }

    #[test]
    fn test_package_of_activity_key() {
        assert_eq!(package_of("com.example/.MainActivity"), "com.example");
        assert_eq!(package_of("com.example"), "com.example");
    }

    #[test]
    fn test_variant_from_columns() {
        let variant =
            TagItemVariant::from_columns("SHORTCUT", Some("pkg".into()), Some("s1".into()), None)
                .unwrap();
        assert_eq!(
            variant,
            TagItemVariant::Shortcut {
                package: "pkg".into(),
                shortcut_id: "s1".into()
            }
        );

        let tag = TagItemVariant::from_columns("TAG", None, None, Some(9)).unwrap();
        assert_eq!(tag.target_tag_id(), Some(9));
        assert!(!tag.is_leaf_ref());

        assert!(TagItemVariant::from_columns("TAG", None, None, None).is_err());
        assert!(TagItemVariant::from_columns("WIDGET", None, None, None).is_err());
    }
}
