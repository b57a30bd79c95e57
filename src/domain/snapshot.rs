//! Store Snapshot
//!
//! A consistent, read-only copy of every tag and record, taken in one locked
//! read. A resolution pass works exclusively against one snapshot.

use std::collections::{BTreeSet, HashMap};

use super::tag::Tag;
use super::tag_item::TagItemRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub tags: HashMap<u32, Tag>,
    /// Records per tag, sorted by `order`
    pub items: HashMap<u32, Vec<TagItemRecord>>,
}

impl StoreSnapshot {
    pub fn tag(&self, id: u32) -> Option<&Tag> {
        self.tags.get(&id)
    }

    pub fn items_for_tag(&self, tag_id: u32) -> &[TagItemRecord] {
        self.items.get(&tag_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Packages referenced by any app or shortcut record
    pub fn referenced_packages(&self) -> BTreeSet<String> {
        self.items
            .values()
            .flatten()
            .filter_map(|record| record.variant.package_key())
            .map(str::to_string)
            .collect()
    }

    pub fn with_tag(mut self, id: u32, name: &str) -> Self {
        self.tags.insert(id, Tag::new(id, name.to_string()));
        self
    }

    /// Adds a tag holding `records`, renumbered in the given order
    pub fn with_items(mut self, tag_id: u32, records: Vec<TagItemRecord>) -> Self {
        self.tags
            .entry(tag_id)
            .or_insert_with(|| Tag::new(tag_id, format!("Tag {}", tag_id)));
        let records = records
            .into_iter()
            .enumerate()
            .map(|(index, mut record)| {
                record.tag_id = tag_id;
                record.order = index as i32;
                record
            })
            .collect();
        self.items.insert(tag_id, records);
        self
    }
}
