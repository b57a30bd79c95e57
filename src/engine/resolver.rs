//! Tag Graph Resolver
//!
//! Derives, for every tag, a non-cyclic representative and the resolved
//! form of each of its children. Tags form an arena indexed by id; a
//! `TagRef` is just an integer, so cycles are detected with an explicit
//! visited set of ids on the current descent.
//!
//! A `ResolutionPass` is scoped to one recomputation: its memo table and
//! visited sets never outlive it, and it only reads its `StoreSnapshot`.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use crate::domain::{
    LeafItem, LeafKey, ResolvedItem, StoreSnapshot, TagItemRecord, TagItemVariant, UiRow,
};

/// What a computed value was derived from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    /// Tags whose records were read, including dangling targets
    pub tags: BTreeSet<u32>,
    /// Packages whose shortcut lists were read
    pub packages: BTreeSet<String>,
}

impl Dependencies {
    pub fn for_tag(tag_id: u32) -> Self {
        let mut deps = Self::default();
        deps.tags.insert(tag_id);
        deps
    }

    pub fn merge(&mut self, other: &Dependencies) {
        self.tags.extend(other.tags.iter().copied());
        self.packages.extend(other.packages.iter().cloned());
    }

    pub fn touches(&self, tags: &BTreeSet<u32>, packages: &BTreeSet<String>) -> bool {
        !self.tags.is_disjoint(tags) || !self.packages.is_disjoint(packages)
    }
}

/// The catalog as seen by one pass
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    apps: BTreeMap<String, LeafItem>,
    /// First catalog key per package, for records keyed by bare package
    by_package: HashMap<String, String>,
    shortcuts: HashMap<String, Arc<Vec<LeafItem>>>,
}

impl CatalogView {
    pub fn new(
        apps: impl IntoIterator<Item = LeafItem>,
        shortcuts: HashMap<String, Arc<Vec<LeafItem>>>,
    ) -> Self {
        let apps: BTreeMap<String, LeafItem> = apps
            .into_iter()
            .filter_map(|app| match &app.key {
                LeafKey::App { catalog_key } => Some((catalog_key.clone(), app)),
                LeafKey::Shortcut { .. } => None,
            })
            .collect();

        let mut by_package = HashMap::new();
        for (key, app) in &apps {
            by_package
                .entry(app.package().to_string())
                .or_insert_with(|| key.clone());
        }

        Self {
            apps,
            by_package,
            shortcuts,
        }
    }

    pub fn apps(&self) -> impl Iterator<Item = &LeafItem> {
        self.apps.values()
    }

    pub fn lookup_app(&self, catalog_key: &str) -> Option<&LeafItem> {
        self.apps.get(catalog_key).or_else(|| {
            self.by_package
                .get(catalog_key)
                .and_then(|key| self.apps.get(key))
        })
    }

    pub fn shortcuts_of(&self, package: &str) -> &[LeafItem] {
        self.shortcuts
            .get(package)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    /// Whether this view carries the package's shortcut list, even an empty one
    pub fn has_shortcuts(&self, package: &str) -> bool {
        self.shortcuts.contains_key(package)
    }

    /// Packages in `deps` whose shortcut lists this view lacks
    pub fn missing_packages(&self, deps: &Dependencies) -> BTreeSet<String> {
        deps.packages
            .iter()
            .filter(|package| !self.has_shortcuts(package))
            .cloned()
            .collect()
    }

    pub fn lookup_shortcut(&self, package: &str, shortcut_id: &str) -> Option<&LeafItem> {
        self.shortcuts_of(package).iter().find(|shortcut| {
            matches!(&shortcut.key, LeafKey::Shortcut { shortcut_id: id, .. } if id == shortcut_id)
        })
    }
}

#[derive(Debug, Clone)]
struct Memo {
    representative: Option<ResolvedItem>,
    deps: Dependencies,
}

/// One resolution pass over a consistent snapshot
pub struct ResolutionPass<'a> {
    store: &'a StoreSnapshot,
    catalog: &'a CatalogView,
    cycle_label: &'a str,
    /// Representatives by tag id; never holds `Cycle`
    memo: HashMap<u32, Memo>,
}

impl<'a> ResolutionPass<'a> {
    pub fn new(store: &'a StoreSnapshot, catalog: &'a CatalogView, cycle_label: &'a str) -> Self {
        Self {
            store,
            catalog,
            cycle_label,
            memo: HashMap::new(),
        }
    }

    pub fn store(&self) -> &'a StoreSnapshot {
        self.store
    }

    pub fn catalog(&self) -> &'a CatalogView {
        self.catalog
    }

    pub fn cycle_label(&self) -> &'a str {
        self.cycle_label
    }

    /// Representative of a tag: a leaf, `Cycle`, or `None` when absent
    pub fn representative_of(&mut self, tag_id: u32) -> Option<ResolvedItem> {
        self.representative_with_deps(tag_id).0
    }

    pub fn representative_with_deps(&mut self, tag_id: u32) -> (Option<ResolvedItem>, Dependencies) {
        let mut visited = HashSet::new();
        self.representative(tag_id, &mut visited)
    }

    fn representative(
        &mut self,
        tag_id: u32,
        visited: &mut HashSet<u32>,
    ) -> (Option<ResolvedItem>, Dependencies) {
        if visited.contains(&tag_id) {
            // Path-dependent, so never memoized
            return (Some(ResolvedItem::Cycle), Dependencies::for_tag(tag_id));
        }

        if let Some(memo) = self.memo.get(&tag_id) {
            return (memo.representative.clone(), memo.deps.clone());
        }

        let mut deps = Dependencies::for_tag(tag_id);
        let representative = match self.store.items_for_tag(tag_id).first() {
            None => None,
            Some(first) => match &first.variant {
                TagItemVariant::Tag { target_tag_id } => {
                    visited.insert(tag_id);
                    let (target, target_deps) = self.representative(*target_tag_id, visited);
                    visited.remove(&tag_id);
                    deps.merge(&target_deps);
                    target
                }
                variant => {
                    let (leaf, leaf_deps) = self.resolve_leaf(variant);
                    deps.merge(&leaf_deps);
                    leaf.map(ResolvedItem::Leaf)
                }
            },
        };

        if !matches!(representative, Some(ResolvedItem::Cycle)) {
            self.memo.insert(
                tag_id,
                Memo {
                    representative: representative.clone(),
                    deps: deps.clone(),
                },
            );
        }

        (representative, deps)
    }

    fn resolve_leaf(&self, variant: &TagItemVariant) -> (Option<LeafItem>, Dependencies) {
        let mut deps = Dependencies::default();
        let leaf = match variant {
            TagItemVariant::App { catalog_key } => self.catalog.lookup_app(catalog_key).cloned(),
            TagItemVariant::Shortcut {
                package,
                shortcut_id,
            } => {
                deps.packages.insert(package.clone());
                self.catalog.lookup_shortcut(package, shortcut_id).cloned()
            }
            TagItemVariant::Tag { .. } => None,
        };
        (leaf, deps)
    }

    /// Resolve one record by dispatching on its variant
    ///
    /// The owning tag does not need to exist. `None` means the reference dangles.
    pub fn resolve_record(&mut self, record: &TagItemRecord) -> Option<ResolvedItem> {
        self.resolve_record_with_deps(record).0
    }

    pub fn resolve_record_with_deps(
        &mut self,
        record: &TagItemRecord,
    ) -> (Option<ResolvedItem>, Dependencies) {
        match &record.variant {
            TagItemVariant::Tag { target_tag_id } => {
                let mut deps = Dependencies::for_tag(*target_tag_id);
                let Some(tag) = self.store.tag(*target_tag_id).cloned() else {
                    return (None, deps);
                };

                // Fresh visited set per slot: siblings are independent
                let (representative, rep_deps) = self.representative_with_deps(*target_tag_id);
                deps.merge(&rep_deps);

                let item = match representative {
                    Some(ResolvedItem::Cycle) => ResolvedItem::Cycle,
                    representative => ResolvedItem::folder(tag, representative),
                };
                (Some(item), deps)
            }
            variant => {
                let (leaf, deps) = self.resolve_leaf(variant);
                (leaf.map(ResolvedItem::Leaf), deps)
            }
        }
    }

    /// Resolved children of a tag in stored order, dangling slots omitted
    pub fn children_of(&mut self, tag_id: u32) -> (Vec<UiRow>, Dependencies) {
        let mut deps = Dependencies::for_tag(tag_id);
        let mut rows = Vec::new();

        for record in self.store.items_for_tag(tag_id) {
            let (item, item_deps) = self.resolve_record_with_deps(record);
            deps.merge(&item_deps);
            match item {
                Some(item) => rows.push(UiRow::from_record(record.clone(), item, self.cycle_label)),
                None => log::debug!(
                    "Skipping dangling {} reference at tag {} order {}",
                    record.variant.as_str(),
                    tag_id,
                    record.order
                ),
            }
        }

        (rows, deps)
    }

    /// Shortcut rows of an application's package
    pub fn shortcut_rows(&self, package: &str) -> (Vec<UiRow>, Dependencies) {
        let mut deps = Dependencies::default();
        deps.packages.insert(package.to_string());
        let rows = self
            .catalog
            .shortcuts_of(package)
            .iter()
            .cloned()
            .map(UiRow::from_leaf)
            .collect();
        (rows, deps)
    }
}
