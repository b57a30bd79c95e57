//! View Projector
//!
//! Turns one resolution pass into the row lists the launcher renders.

use pinyin::ToPinyin;
use serde::{Deserialize, Serialize};

use crate::config::PopupMode;
use crate::domain::{
    package_of, LeafKey, ResolvedItem, TagItemVariant, UiRow, FAVORITES_TAG_ID, PINNED_TAG_ID,
};
use super::resolver::{Dependencies, ResolutionPass};

/// Rows of the all-items index sharing a first letter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexGroup {
    /// Uppercase ASCII letter, or `#` for everything else
    pub letter: char,
    pub rows: Vec<UiRow>,
}

/// Where a row list comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowSource {
    /// Every resolved child of a tag
    Children(u32),
    /// Children of a tag without its first record
    ChildrenAfterFirst(u32),
    /// Live shortcuts of an application package
    Shortcuts(String),
}

impl RowSource {
    pub fn favorites() -> Self {
        RowSource::Children(FAVORITES_TAG_ID)
    }
}

/// Sort key for labels: lowercase, with CJK characters spelled out in pinyin
pub fn sort_key(label: &str) -> String {
    let mut key = String::with_capacity(label.len());
    for c in label.chars() {
        match c.to_pinyin() {
            Some(p) => key.push_str(p.plain()),
            None => key.extend(c.to_lowercase()),
        }
    }
    key
}

fn index_letter(key: &str) -> char {
    match key.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
        _ => '#',
    }
}

/// Catalog apps merged with the Pinned tag's items, sorted and grouped by first letter
pub fn all_items_index(pass: &mut ResolutionPass<'_>) -> (Vec<IndexGroup>, Dependencies) {
    let (pinned, deps) = pass.children_of(PINNED_TAG_ID);

    let mut rows: Vec<(String, UiRow)> = pass
        .catalog()
        .apps()
        .cloned()
        .map(UiRow::from_leaf)
        .chain(pinned)
        .map(|row| (sort_key(&row.label), row))
        .collect();
    rows.sort_by(|(a_key, a), (b_key, b)| a_key.cmp(b_key).then_with(|| a.label.cmp(&b.label)));

    let mut groups: Vec<IndexGroup> = Vec::new();
    for (key, row) in rows {
        let letter = index_letter(&key);
        match groups.last_mut() {
            Some(group) if group.letter == letter => group.rows.push(row),
            _ => groups.push(IndexGroup {
                letter,
                rows: vec![row],
            }),
        }
    }

    (groups, deps)
}

/// Compute the rows of one source
pub fn project_rows(pass: &mut ResolutionPass<'_>, source: &RowSource) -> (Vec<UiRow>, Dependencies) {
    match source {
        RowSource::Children(tag_id) => pass.children_of(*tag_id),
        RowSource::ChildrenAfterFirst(tag_id) => {
            let (mut rows, deps) = pass.children_of(*tag_id);
            let first = pass.store().items_for_tag(*tag_id).first().cloned();
            rows.retain(|row| row.record != first);
            (rows, deps)
        }
        RowSource::Shortcuts(package) => pass.shortcut_rows(package),
    }
}

/// What a swipe on `row` should open, if anything
pub fn popup_source(row: &UiRow, mode: PopupMode) -> Option<RowSource> {
    let folder = match &row.item {
        ResolvedItem::Folder { children, .. } => Some(children.tag_id()),
        _ => None,
    };
    let tag_id = row
        .record
        .as_ref()
        .and_then(|record| record.variant.target_tag_id())
        .or(folder);

    if let Some(tag_id) = tag_id {
        return Some(match mode {
            PopupMode::Inclusive => RowSource::Children(tag_id),
            PopupMode::ExcludeRepresentative => RowSource::ChildrenAfterFirst(tag_id),
        });
    }

    let package = match (&row.record, &row.item) {
        (Some(record), _) => match &record.variant {
            TagItemVariant::App { catalog_key } => Some(package_of(catalog_key)),
            _ => None,
        },
        (None, ResolvedItem::Leaf(leaf)) => match leaf.key {
            LeafKey::App { .. } => Some(leaf.package()),
            LeafKey::Shortcut { .. } => None,
        },
        _ => None,
    };
    package.map(|package| RowSource::Shortcuts(package.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LeafItem, StoreSnapshot, TagItemRecord};
    use crate::engine::resolver::CatalogView;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn view() -> CatalogView {
        let mut shortcuts = HashMap::new();
        shortcuts.insert(
            "com.mail".to_string(),
            Arc::new(vec![
                LeafItem::shortcut("com.mail", "compose", "Compose"),
                LeafItem::shortcut("com.mail", "inbox", "Inbox"),
            ]),
        );
        CatalogView::new(
            vec![
                LeafItem::app("com.mail", "mail"),
                LeafItem::app("com.browser", "Browser"),
                LeafItem::app("com.wechat", "微信"),
                LeafItem::app("com.nine", "9GAG"),
            ],
            shortcuts,
        )
    }

    #[test]
    fn test_sort_key_spells_out_pinyin() {
        assert_eq!(sort_key("微信"), "weixin");
        assert_eq!(sort_key("Maps"), "maps");
    }

    #[test]
    fn test_index_merges_pinned_and_groups_case_insensitively() {
        let store = StoreSnapshot::default().with_items(
            PINNED_TAG_ID,
            vec![TagItemRecord::shortcut_ref(PINNED_TAG_ID, 0, "com.mail", "compose")],
        );
        let catalog = view();
        let mut pass = ResolutionPass::new(&store, &catalog, "loop");

        let (groups, deps) = all_items_index(&mut pass);
        let letters: Vec<char> = groups.iter().map(|g| g.letter).collect();
        assert_eq!(letters, vec!['#', 'B', 'C', 'M', 'W']);

        let labels: Vec<&str> = groups
            .iter()
            .flat_map(|g| g.rows.iter().map(|r| r.label.as_str()))
            .collect();
        assert_eq!(labels, vec!["9GAG", "Browser", "Compose", "mail", "微信"]);

        assert!(deps.tags.contains(&PINNED_TAG_ID));
        assert!(deps.packages.contains("com.mail"));
    }

    #[test]
    fn test_uninstalled_pinned_app_leaves_index() {
        let store = StoreSnapshot::default().with_items(
            PINNED_TAG_ID,
            vec![TagItemRecord::app_ref(PINNED_TAG_ID, 0, "com.removed")],
        );
        let catalog = view();
        let mut pass = ResolutionPass::new(&store, &catalog, "loop");

        let (groups, _) = all_items_index(&mut pass);
        let total: usize = groups.iter().map(|g| g.rows.len()).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_popup_source_by_row_kind() {
        let tag_row = UiRow::from_record(TagItemRecord::tag_ref(1, 0, 7), ResolvedItem::Cycle, "loop");
        assert_eq!(
            popup_source(&tag_row, PopupMode::Inclusive),
            Some(RowSource::Children(7))
        );
        assert_eq!(
            popup_source(&tag_row, PopupMode::ExcludeRepresentative),
            Some(RowSource::ChildrenAfterFirst(7))
        );

        let app_row = UiRow::from_record(
            TagItemRecord::app_ref(1, 1, "com.mail/.Main"),
            ResolvedItem::Leaf(LeafItem::app("com.mail/.Main", "Mail")),
            "loop",
        );
        assert_eq!(
            popup_source(&app_row, PopupMode::Inclusive),
            Some(RowSource::Shortcuts("com.mail".to_string()))
        );

        let index_row = UiRow::from_leaf(LeafItem::app("com.mail", "Mail"));
        assert_eq!(
            popup_source(&index_row, PopupMode::Inclusive),
            Some(RowSource::Shortcuts("com.mail".to_string()))
        );

        let shortcut_row = UiRow::from_leaf(LeafItem::shortcut("com.mail", "compose", "Compose"));
        assert_eq!(popup_source(&shortcut_row, PopupMode::Inclusive), None);
    }

    #[test]
    fn test_popup_rows_inclusive_and_excluding() {
        let store = StoreSnapshot::default().with_items(
            7,
            vec![
                TagItemRecord::app_ref(7, 0, "com.mail"),
                TagItemRecord::app_ref(7, 1, "com.browser"),
            ],
        );
        let catalog = view();
        let mut pass = ResolutionPass::new(&store, &catalog, "loop");

        let (all, _) = project_rows(&mut pass, &RowSource::Children(7));
        assert_eq!(all.len(), 2);

        let (rest, _) = project_rows(&mut pass, &RowSource::ChildrenAfterFirst(7));
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].label, "Browser");

        let (shortcuts, deps) = project_rows(&mut pass, &RowSource::Shortcuts("com.mail".into()));
        assert_eq!(shortcuts.len(), 2);
        assert!(shortcuts.iter().all(|row| row.record.is_none()));
        assert!(deps.packages.contains("com.mail"));
    }
}
