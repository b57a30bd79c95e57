//! Tag Engine
//!
//! The facade the launcher UI talks to. It owns the repositories, the
//! catalog collaborators and every live projection.
//!
//! Projections are `watch` channels. Each remembers the tags and shortcut
//! packages it was computed from; a change marks only the projections it
//! touches as dirty, and the next resolution pass recomputes just those.
//! Passes are serialized by the pass lock and numbered by a generation
//! counter: a pass that finds a newer change was signalled while it was
//! reading its inputs throws its results away and starts over, so
//! subscribers only ever see values computed from one consistent snapshot.
//!
//! A pass never waits on a shortcut query. It resolves against the shortcut
//! lists already cached and publishes every projection that read none of
//! the missing ones. The rest stay dirty, keep their last value, and are
//! recomputed once a background fetch for their package lands.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, Weak};

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::catalog::{ItemCatalog, SystemIntegration};
use crate::config::LauncherConfig;
use crate::domain::{
    package_of, DomainError, DomainResult, LeafItem, LeafKey, ResolvedItem, StoreSnapshot, Tag,
    TagItemRecord, TagItemVariant, UiRow, FAVORITES_TAG_ID, PINNED_TAG_ID,
};
use crate::repository::{
    DbState, Repository, TagItemPositioningOperations, TagItemRepository, TagPromotionOperations,
    TagRepository,
};
use super::actions::{build_actions, Action, ActionEffect, ActionOutcome};
use super::projector::{all_items_index, popup_source, project_rows, IndexGroup, RowSource};
use super::resolver::{CatalogView, Dependencies, ResolutionPass};
use super::shortcut_cache::ShortcutCache;

/// What changed since the last pass
#[derive(Debug, Clone, Default)]
struct Change {
    /// Installed apps changed; every projection is affected
    catalog: bool,
    /// Store changes were missed; recompute everything without refetching
    everything: bool,
    tags: BTreeSet<u32>,
    packages: BTreeSet<String>,
}

impl Change {
    fn tags(tag_ids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            tags: tag_ids.into_iter().collect(),
            ..Self::default()
        }
    }

    fn package(package: &str) -> Self {
        Self {
            packages: BTreeSet::from([package.to_string()]),
            ..Self::default()
        }
    }

    fn catalog() -> Self {
        Self {
            catalog: true,
            ..Self::default()
        }
    }

    fn everything() -> Self {
        Self {
            everything: true,
            ..Self::default()
        }
    }

    fn merge(&mut self, other: Change) {
        self.catalog |= other.catalog;
        self.everything |= other.everything;
        self.tags.extend(other.tags);
        self.packages.extend(other.packages);
    }

    fn touches(&self, deps: &Dependencies) -> bool {
        self.catalog || self.everything || deps.touches(&self.tags, &self.packages)
    }
}

/// One live projection
struct Slot<T> {
    tx: watch::Sender<T>,
    deps: Dependencies,
    dirty: bool,
}

impl<T: PartialEq> Slot<T> {
    fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self {
            tx,
            deps: Dependencies::default(),
            dirty: true,
        }
    }

    fn is_observed(&self) -> bool {
        !self.tx.is_closed()
    }

    fn mark(&mut self, change: &Change) {
        if change.touches(&self.deps) {
            self.dirty = true;
        }
    }

    /// Store a freshly computed value; subscribers are woken only if it differs
    fn publish(&mut self, value: T, deps: Dependencies) -> bool {
        self.deps = deps;
        self.dirty = false;
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }

    /// Publish a value unless it read a shortcut list `catalog` lacks
    ///
    /// Held back values leave the slot dirty and add the missing packages
    /// to `waiting`.
    fn offer(
        &mut self,
        value: T,
        deps: Dependencies,
        catalog: &CatalogView,
        waiting: &mut BTreeSet<String>,
    ) -> bool {
        let missing = catalog.missing_packages(&deps);
        if missing.is_empty() {
            return self.publish(value, deps);
        }
        waiting.extend(missing);
        self.deps = deps;
        false
    }
}

#[derive(Default)]
struct Views {
    /// Installed apps as of the last pass; `None` after a catalog change
    apps: Option<Vec<LeafItem>>,
    index: Option<Slot<Vec<IndexGroup>>>,
    representatives: HashMap<u32, Slot<Option<ResolvedItem>>>,
    rows: HashMap<RowSource, Slot<Vec<UiRow>>>,
}

impl Views {
    /// Drop projections nobody listens to any more
    fn prune(&mut self) {
        if self.index.as_ref().is_some_and(|slot| !slot.is_observed()) {
            self.index = None;
        }
        self.representatives.retain(|_, slot| slot.is_observed());
        self.rows.retain(|_, slot| slot.is_observed());
    }

    fn mark(&mut self, change: &Change) {
        if change.catalog {
            self.apps = None;
        }
        if let Some(slot) = self.index.as_mut() {
            slot.mark(change);
        }
        for slot in self.representatives.values_mut() {
            slot.mark(change);
        }
        for slot in self.rows.values_mut() {
            slot.mark(change);
        }
    }

    fn any_dirty(&self) -> bool {
        self.index.as_ref().is_some_and(|slot| slot.dirty)
            || self.representatives.values().any(|slot| slot.dirty)
            || self.rows.values().any(|slot| slot.dirty)
    }
}

#[derive(Default)]
struct Counters {
    passes: AtomicUsize,
    discarded_passes: AtomicUsize,
    index_builds: AtomicUsize,
}

/// Pass bookkeeping, mostly for tests and diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Number of changes signalled so far
    pub generation: u64,
    pub passes: usize,
    /// Passes thrown away because a newer change arrived mid-pass
    pub discarded_passes: usize,
    /// Times the all-items index was rebuilt
    pub index_builds: usize,
}

pub struct TagEngine {
    me: Weak<TagEngine>,
    db: DbState,
    tags: TagRepository,
    items: TagItemRepository,
    catalog: Arc<dyn ItemCatalog>,
    system: Arc<dyn SystemIntegration>,
    config: LauncherConfig,
    shortcuts: ShortcutCache,
    generation: AtomicU64,
    pending: StdMutex<Change>,
    pass_lock: Mutex<()>,
    views: StdMutex<Views>,
    counters: Counters,
}

impl TagEngine {
    pub fn new(
        db: DbState,
        catalog: Arc<dyn ItemCatalog>,
        system: Arc<dyn SystemIntegration>,
        config: LauncherConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            tags: db.tag_repo(),
            items: db.tag_item_repo(),
            db,
            shortcuts: ShortcutCache::new(catalog.clone()),
            catalog,
            system,
            config,
            generation: AtomicU64::new(0),
            pending: StdMutex::new(Change::default()),
            pass_lock: Mutex::new(()),
            views: StdMutex::new(Views::default()),
            counters: Counters::default(),
        })
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            generation: self.generation.load(Ordering::SeqCst),
            passes: self.counters.passes.load(Ordering::SeqCst),
            discarded_passes: self.counters.discarded_passes.load(Ordering::SeqCst),
            index_builds: self.counters.index_builds.load(Ordering::SeqCst),
        }
    }

    /// Close the underlying store; projections keep their last values
    pub async fn close(&self) {
        self.db.close().await;
    }

    // ========================================================================
    // Projections
    // ========================================================================

    /// Live representative of a tag: a leaf, `Cycle`, or `None`
    pub async fn representative_of(
        &self,
        tag_id: u32,
    ) -> DomainResult<watch::Receiver<Option<ResolvedItem>>> {
        let rx = self
            .views()
            .representatives
            .entry(tag_id)
            .or_insert_with(|| Slot::new(None))
            .tx
            .subscribe();
        self.refresh().await?;
        Ok(rx)
    }

    /// Live resolved children of a tag, in stored order
    pub async fn children_of(&self, tag_id: u32) -> DomainResult<watch::Receiver<Vec<UiRow>>> {
        self.subscribe_rows(RowSource::Children(tag_id)).await
    }

    pub async fn favorites_strip(&self) -> DomainResult<watch::Receiver<Vec<UiRow>>> {
        self.subscribe_rows(RowSource::favorites()).await
    }

    /// Live popup list for a swiped row; empty for rows that open nothing
    pub async fn popup_for(&self, row: &UiRow) -> DomainResult<watch::Receiver<Vec<UiRow>>> {
        match popup_source(row, self.config.popup_mode) {
            Some(source) => self.subscribe_rows(source).await,
            None => {
                let (_, rx) = watch::channel(Vec::new());
                Ok(rx)
            }
        }
    }

    pub async fn all_items_index(&self) -> DomainResult<watch::Receiver<Vec<IndexGroup>>> {
        let rx = self
            .views()
            .index
            .get_or_insert_with(|| Slot::new(Vec::new()))
            .tx
            .subscribe();
        self.refresh().await?;
        Ok(rx)
    }

    /// A slot left behind by a failed subscription is pruned once its receiver drops
    async fn subscribe_rows(&self, source: RowSource) -> DomainResult<watch::Receiver<Vec<UiRow>>> {
        let rx = self
            .views()
            .rows
            .entry(source)
            .or_insert_with(|| Slot::new(Vec::new()))
            .tx
            .subscribe();
        self.refresh().await?;
        Ok(rx)
    }

    // ========================================================================
    // Resolution passes
    // ========================================================================

    fn pending(&self) -> MutexGuard<'_, Change> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn views(&self) -> MutexGuard<'_, Views> {
        self.views.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a change and run a pass for it
    async fn signal(&self, change: Change) -> DomainResult<()> {
        self.pending().merge(change);
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.refresh().await
    }

    /// Signal a change that follows a committed write
    ///
    /// The write already succeeded, so a failed refresh is logged and left
    /// for the next pass rather than reported.
    async fn apply_change(&self, change: Change) {
        if let Err(e) = self.signal(change).await {
            log::warn!("Projections not refreshed after write: {}", e);
        }
    }

    /// Recompute dirty projections until one pass completes unsuperseded
    ///
    /// On error nothing is published and dirty flags stay set, so the
    /// next pass retries. The views lock is only taken between awaits.
    async fn refresh(&self) -> DomainResult<()> {
        let _pass = self.pass_lock.lock().await;

        loop {
            let generation = self.generation.load(Ordering::SeqCst);
            let Some(needs_apps) = self.begin_pass() else {
                return Ok(());
            };

            self.counters.passes.fetch_add(1, Ordering::SeqCst);
            log::debug!("Resolution pass for generation {} started", generation);

            let snapshot = match self.items.snapshot().await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    log::warn!("Resolution pass {} could not read the store: {}", generation, e);
                    return Err(e);
                }
            };
            let apps = if needs_apps {
                Some(self.catalog.list_leaf_apps().await)
            } else {
                None
            };

            let Some(waiting) = self.finish_pass(generation, &snapshot, apps) else {
                continue;
            };
            for package in waiting {
                self.prefetch(package);
            }
            return Ok(());
        }
    }

    /// Fold queued changes into dirty flags
    ///
    /// `None` when nothing needs recomputing, otherwise whether the installed
    /// apps have to be listed again.
    fn begin_pass(&self) -> Option<bool> {
        let mut views = self.views();
        views.prune();
        let change = std::mem::take(&mut *self.pending());
        views.mark(&change);
        views.any_dirty().then(|| views.apps.is_none())
    }

    /// Recompute dirty projections from inputs already in hand
    ///
    /// Returns `None` if a newer change was signalled meanwhile, otherwise
    /// the packages some projection is still waiting on.
    fn finish_pass(
        &self,
        generation: u64,
        snapshot: &StoreSnapshot,
        apps: Option<Vec<LeafItem>>,
    ) -> Option<BTreeSet<String>> {
        let mut guard = self.views();
        let views = &mut *guard;
        if let Some(apps) = apps {
            views.apps = Some(apps);
        }

        if self.generation.load(Ordering::SeqCst) != generation {
            self.counters.discarded_passes.fetch_add(1, Ordering::SeqCst);
            log::debug!("Resolution pass {} superseded, discarding", generation);
            return None;
        }

        let catalog = CatalogView::new(
            views.apps.iter().flatten().cloned(),
            self.shortcuts.cached(),
        );
        let mut pass = ResolutionPass::new(snapshot, &catalog, &self.config.cycle_label);
        let mut waiting = BTreeSet::new();
        let mut changed = 0usize;

        if let Some(slot) = views.index.as_mut().filter(|slot| slot.dirty) {
            let (groups, deps) = all_items_index(&mut pass);
            self.counters.index_builds.fetch_add(1, Ordering::SeqCst);
            changed += usize::from(slot.offer(groups, deps, &catalog, &mut waiting));
        }

        for (tag_id, slot) in views.representatives.iter_mut().filter(|(_, slot)| slot.dirty) {
            let (representative, deps) = pass.representative_with_deps(*tag_id);
            changed += usize::from(slot.offer(representative, deps, &catalog, &mut waiting));
        }

        for (source, slot) in views.rows.iter_mut().filter(|(_, slot)| slot.dirty) {
            let (rows, deps) = project_rows(&mut pass, source);
            changed += usize::from(slot.offer(rows, deps, &catalog, &mut waiting));
        }

        log::debug!(
            "Resolution pass {} finished, {} projections changed, {} packages pending",
            generation,
            changed,
            waiting.len()
        );
        Some(waiting)
    }

    /// Fetch a package's shortcuts off the pass, then refresh what reads them
    fn prefetch(&self, package: String) {
        let Some(fetch) = self.shortcuts.begin_fetch(&package) else {
            return;
        };
        let engine = self.me.clone();

        log::debug!("Fetching shortcuts of {}", package);
        tokio::spawn(async move {
            fetch.await;
            let Some(engine) = engine.upgrade() else {
                return;
            };
            if let Err(e) = engine.signal(Change::package(&package)).await {
                log::warn!("Refresh after fetching shortcuts of {} failed: {}", package, e);
            }
        });
    }

    // ========================================================================
    // Change signals
    // ========================================================================

    /// Installed apps changed; drops every cached shortcut list
    pub async fn notify_catalog_changed(&self) -> DomainResult<()> {
        self.shortcuts.clear();
        self.signal(Change::catalog()).await
    }

    /// One package published a different shortcut set
    pub async fn notify_shortcuts_changed(&self, package: &str) -> DomainResult<()> {
        self.shortcuts.invalidate(package);
        self.signal(Change::package(package)).await
    }

    /// Records of these tags changed outside the engine
    pub async fn notify_tags_changed(&self, tag_ids: &[u32]) -> DomainResult<()> {
        self.signal(Change::tags(tag_ids.iter().copied())).await
    }

    /// Forward committed store changes from any writer into passes
    ///
    /// The task ends when the change feed closes, or at the first change
    /// after the engine is dropped.
    pub fn watch_store(&self) -> JoinHandle<()> {
        let mut rx = self.db.subscribe();
        let engine = self.me.clone();

        tokio::spawn(async move {
            loop {
                let change = match rx.recv().await {
                    Ok(change) => Change::tags(change.tag_ids),
                    Err(RecvError::Lagged(missed)) => {
                        log::warn!("Missed {} store changes, refreshing everything", missed);
                        Change::everything()
                    }
                    Err(RecvError::Closed) => break,
                };

                let Some(engine) = engine.upgrade() else {
                    break;
                };
                if let Err(e) = engine.signal(change).await {
                    log::warn!("Refresh after store change failed: {}", e);
                }
            }
            log::debug!("Store watcher stopped");
        })
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub async fn items_for_tag(&self, tag_id: u32) -> DomainResult<Vec<TagItemRecord>> {
        self.items.items_for_tag(tag_id).await
    }

    pub async fn list_tags(&self) -> DomainResult<Vec<Tag>> {
        self.tags.list().await
    }

    pub async fn find_tag(&self, tag_id: u32) -> DomainResult<Option<Tag>> {
        self.tags.find_by_id(tag_id).await
    }

    /// Resolve a single record against the current store and catalog
    ///
    /// Only the shortcut lists this record's resolution reads are fetched.
    pub async fn resolve_record(&self, record: &TagItemRecord) -> DomainResult<Option<ResolvedItem>> {
        let snapshot = self.items.snapshot().await?;
        let apps = self.catalog.list_leaf_apps().await;
        let mut shortcuts = self.shortcuts.cached();

        loop {
            let catalog = CatalogView::new(apps.iter().cloned(), shortcuts.clone());
            let mut pass = ResolutionPass::new(&snapshot, &catalog, &self.config.cycle_label);
            let (resolved, deps) = pass.resolve_record_with_deps(record);
            let missing = catalog.missing_packages(&deps);
            if missing.is_empty() {
                return Ok(resolved);
            }

            let mut fetched = self.shortcuts.fetch_all(missing.iter().cloned()).await;
            for package in missing {
                let list = fetched.remove(&package).unwrap_or_default();
                shortcuts.insert(package, list);
            }
        }
    }

    // ========================================================================
    // Actions
    // ========================================================================

    pub async fn actions_for(&self, row: &UiRow) -> DomainResult<Vec<Action>> {
        let favorites = self.items.items_for_tag(FAVORITES_TAG_ID).await?;
        Ok(build_actions(row, &favorites))
    }

    pub async fn perform(&self, action: &Action) -> DomainResult<ActionOutcome> {
        match &action.effect {
            ActionEffect::ToggleFavorite(leaf) => {
                self.toggle_favorite(leaf).await?;
                Ok(ActionOutcome::Done)
            }
            ActionEffect::EditTag(tag_id) => Ok(ActionOutcome::OpenTag(*tag_id)),
            ActionEffect::PromoteToTag(record) => {
                let tag_id = self.promote_to_tag(record).await?;
                Ok(ActionOutcome::OpenTag(tag_id))
            }
            ActionEffect::OpenSettings(leaf) => {
                self.system.open_settings_for(leaf);
                Ok(ActionOutcome::Done)
            }
            ActionEffect::Uninstall(leaf) => {
                self.system.request_uninstall(leaf);
                Ok(ActionOutcome::Done)
            }
        }
    }

    /// Launch what a row stands for; returns `false` when there is nothing to launch
    pub fn launch(&self, row: &UiRow) -> bool {
        match row.item.launch_target() {
            Some(leaf) => {
                log::info!("Launching '{}'", leaf.label);
                self.system.launch(leaf);
                true
            }
            None => {
                log::info!("Nothing to launch for '{}'", row.label);
                false
            }
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Replace a tag's records with `items`, in that order
    pub async fn reorder(&self, tag_id: u32, items: &[TagItemRecord]) -> DomainResult<()> {
        self.items.reorder(tag_id, items).await?;
        self.apply_change(Change::tags([tag_id])).await;
        Ok(())
    }

    pub async fn move_item(&self, tag_id: u32, from: usize, to: usize) -> DomainResult<()> {
        self.items.move_item(tag_id, from, to).await?;
        self.apply_change(Change::tags([tag_id])).await;
        Ok(())
    }

    /// Append a reference to the end of a tag
    pub async fn add_item(
        &self,
        tag_id: u32,
        variant: TagItemVariant,
        label_override: Option<String>,
    ) -> DomainResult<TagItemRecord> {
        self.tags.require(tag_id).await?;

        let mut record = TagItemRecord::new(tag_id, 0, variant);
        record.label_override = label_override;

        let stored = self.items.append(&record).await?;
        self.apply_change(Change::tags([tag_id])).await;
        Ok(stored)
    }

    pub async fn remove_item(&self, record: &TagItemRecord) -> DomainResult<()> {
        self.items.remove_and_compact(record).await?;
        self.apply_change(Change::tags([record.tag_id])).await;
        Ok(())
    }

    /// Get-or-create the tag a record expands into
    ///
    /// A tag reference returns its target. An app or shortcut becomes a new
    /// tag (named after the row) holding the item followed by the app's
    /// shortcuts, and its slot in the parent now references that tag.
    pub async fn promote_to_tag(&self, record: &TagItemRecord) -> DomainResult<u32> {
        let (fallback_name, extra_members) = match &record.variant {
            TagItemVariant::Tag { target_tag_id } => return Ok(*target_tag_id),
            TagItemVariant::App { catalog_key } => {
                let name = self
                    .catalog
                    .lookup_app(catalog_key)
                    .await
                    .map(|app| app.label)
                    .unwrap_or_else(|| catalog_key.clone());
                let shortcuts = self.shortcuts.get(package_of(catalog_key)).await;
                let members: Vec<TagItemVariant> =
                    shortcuts.iter().map(LeafItem::to_variant).collect();
                (name, members)
            }
            TagItemVariant::Shortcut {
                package,
                shortcut_id,
            } => {
                let shortcuts = self.shortcuts.get(package).await;
                let name = shortcuts
                    .iter()
                    .find(|shortcut| {
                        matches!(&shortcut.key, LeafKey::Shortcut { shortcut_id: id, .. } if id == shortcut_id)
                    })
                    .map(|shortcut| shortcut.label.clone())
                    .unwrap_or_else(|| shortcut_id.clone());
                (name, Vec::new())
            }
        };
        let name = record.label_override.clone().unwrap_or(fallback_name);

        let new_tag_id = self
            .items
            .promote_to_tag(record, &name, &extra_members)
            .await?;
        self.apply_change(Change::tags([record.tag_id, new_tag_id])).await;
        Ok(new_tag_id)
    }

    /// Add the leaf to Favorites, or remove it; returns whether it is now a favorite
    pub async fn toggle_favorite(&self, leaf: &LeafItem) -> DomainResult<bool> {
        let now_favorite = self
            .items
            .toggle_in_tag(FAVORITES_TAG_ID, &leaf.to_variant())
            .await?;

        log::info!(
            "'{}' {} favorites",
            leaf.label,
            if now_favorite { "added to" } else { "removed from" }
        );
        self.apply_change(Change::tags([FAVORITES_TAG_ID])).await;
        Ok(now_favorite)
    }

    /// Accept a pin request from the system: the shortcut joins the Pinned tag once
    pub async fn pin_shortcut(
        &self,
        package: &str,
        shortcut_id: &str,
        label: Option<String>,
    ) -> DomainResult<TagItemRecord> {
        let variant = TagItemVariant::Shortcut {
            package: package.to_string(),
            shortcut_id: shortcut_id.to_string(),
        };
        if let Some(existing) = self.items.find_by_variant(PINNED_TAG_ID, &variant).await? {
            log::debug!("Shortcut {}/{} already pinned", package, shortcut_id);
            return Ok(existing);
        }

        // The pinned shortcut may be new to the cache
        self.shortcuts.invalidate(package);
        let record = self.add_item(PINNED_TAG_ID, variant, label).await?;
        log::info!("Pinned shortcut {}/{}", package, shortcut_id);
        Ok(record)
    }

    pub async fn create_tag(&self, name: &str) -> DomainResult<Tag> {
        let name = validate_tag_name(name)?;
        let tag = self.tags.create(&Tag::new(0, name)).await?;
        self.apply_change(Change::tags([tag.id])).await;
        Ok(tag)
    }

    pub async fn rename_tag(&self, tag_id: u32, name: &str) -> DomainResult<Tag> {
        let name = validate_tag_name(name)?;
        let tag = self.tags.update(&Tag::new(tag_id, name)).await?;
        self.apply_change(Change::tags([tag_id])).await;
        Ok(tag)
    }

    /// Delete a tag and its records; references to it elsewhere become dangling
    pub async fn delete_tag(&self, tag_id: u32) -> DomainResult<()> {
        self.tags.delete(tag_id).await?;
        self.apply_change(Change::tags([tag_id])).await;
        Ok(())
    }
}

fn validate_tag_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::InvalidInput("Tag name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}
