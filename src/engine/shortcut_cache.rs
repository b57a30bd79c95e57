//! Per-package shortcut cache
//!
//! Shortcut queries can be slow, so each package gets its own cell that is
//! filled at most once per catalog refresh cycle. Fetches for different
//! packages run concurrently and never wait on each other. Projection passes
//! only read what is already cached and hand missing packages to
//! [`ShortcutCache::begin_fetch`], which runs off the pass.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::OnceCell;
use tokio::task::JoinSet;

use crate::catalog::ItemCatalog;
use crate::domain::LeafItem;

pub type ShortcutList = Arc<Vec<LeafItem>>;
type Cell = Arc<OnceCell<ShortcutList>>;

#[derive(Default)]
struct Entry {
    cell: Cell,
    /// A background fetch has been handed out for this cell
    fetching: bool,
}

pub struct ShortcutCache {
    catalog: Arc<dyn ItemCatalog>,
    cells: Mutex<HashMap<String, Entry>>,
}

impl ShortcutCache {
    pub fn new(catalog: Arc<dyn ItemCatalog>) -> Self {
        Self {
            catalog,
            cells: Mutex::new(HashMap::new()),
        }
    }

    fn cells(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.cells.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn cell(&self, package: &str) -> Cell {
        self.cells().entry(package.to_string()).or_default().cell.clone()
    }

    /// Every package whose shortcuts are already known, without waiting
    pub fn cached(&self) -> HashMap<String, ShortcutList> {
        self.cells()
            .iter()
            .filter_map(|(package, entry)| {
                entry.cell.get().map(|list| (package.clone(), list.clone()))
            })
            .collect()
    }

    /// Fetch future for a package that is neither cached nor already being fetched
    ///
    /// The returned future owns everything it needs, so callers can spawn it.
    pub fn begin_fetch(
        &self,
        package: &str,
    ) -> Option<impl Future<Output = ShortcutList> + Send + 'static> {
        let mut cells = self.cells();
        let entry = cells.entry(package.to_string()).or_default();
        if entry.fetching || entry.cell.initialized() {
            return None;
        }
        entry.fetching = true;

        let cell = entry.cell.clone();
        let catalog = self.catalog.clone();
        let package = package.to_string();
        Some(async move {
            let list = cell
                .get_or_init(|| async { Arc::new(catalog.list_shortcuts(&package).await) })
                .await
                .clone();
            list
        })
    }

    /// Shortcuts of one package, fetched on first use
    pub async fn get(&self, package: &str) -> ShortcutList {
        let cell = self.cell(package);
        let catalog = self.catalog.clone();
        let list = cell
            .get_or_init(|| async move { Arc::new(catalog.list_shortcuts(package).await) })
            .await
            .clone();
        list
    }

    /// Fetch the given packages concurrently
    ///
    /// A fetch that fails (panics) leaves its package out of the result,
    /// which readers treat as "no shortcuts".
    pub async fn fetch_all(
        &self,
        packages: impl IntoIterator<Item = String>,
    ) -> HashMap<String, ShortcutList> {
        let mut tasks = JoinSet::new();
        for package in packages {
            let cell = self.cell(&package);
            let catalog = self.catalog.clone();
            tasks.spawn(async move {
                let list = cell
                    .get_or_init(|| async { Arc::new(catalog.list_shortcuts(&package).await) })
                    .await
                    .clone();
                (package, list)
            });
        }

        let mut fetched = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((package, list)) => {
                    fetched.insert(package, list);
                }
                Err(e) => log::warn!("Shortcut fetch failed: {}", e),
            }
        }
        fetched
    }

    /// Forget one package; an in-flight fetch for it still completes but is not reused
    pub fn invalidate(&self, package: &str) {
        self.cells().remove(package);
    }

    pub fn clear(&self) {
        self.cells().clear();
    }
}
