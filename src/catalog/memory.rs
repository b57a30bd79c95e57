//! In-memory item catalog
//!
//! Backs tests and embedders that feed the catalog from their own source.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::domain::{LeafItem, LeafKey};
use super::ItemCatalog;

#[derive(Default)]
pub struct InMemoryCatalog {
    apps: Mutex<BTreeMap<String, LeafItem>>,
    shortcuts: Mutex<HashMap<String, Vec<LeafItem>>>,
    shortcut_queries: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or update) an application
    pub fn install_app(&self, app: LeafItem) {
        if let LeafKey::App { catalog_key } = &app.key {
            lock(&self.apps).insert(catalog_key.clone(), app);
        }
    }

    /// Remove an application and the shortcuts of its package
    pub fn uninstall_app(&self, catalog_key: &str) {
        let removed = lock(&self.apps).remove(catalog_key);
        if let Some(app) = removed {
            lock(&self.shortcuts).remove(app.package());
        }
    }

    pub fn set_shortcuts(&self, package: &str, shortcuts: Vec<LeafItem>) {
        lock(&self.shortcuts).insert(package.to_string(), shortcuts);
    }

    /// How many times `list_shortcuts` has been called
    pub fn shortcut_queries(&self) -> usize {
        self.shortcut_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemCatalog for InMemoryCatalog {
    async fn list_leaf_apps(&self) -> Vec<LeafItem> {
        lock(&self.apps).values().cloned().collect()
    }

    async fn list_shortcuts(&self, package: &str) -> Vec<LeafItem> {
        self.shortcut_queries.fetch_add(1, Ordering::SeqCst);
        lock(&self.shortcuts).get(package).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_by_package_or_full_key() {
        let catalog = InMemoryCatalog::new();
        catalog.install_app(LeafItem::app("com.x/.Main", "X"));

        assert_eq!(catalog.lookup_app("com.x/.Main").await.unwrap().label, "X");
        assert_eq!(catalog.lookup_app("com.x").await.unwrap().label, "X");
        assert!(catalog.lookup_app("com.y").await.is_none());
    }

    #[tokio::test]
    async fn test_uninstall_drops_shortcuts() {
        let catalog = InMemoryCatalog::new();
        catalog.install_app(LeafItem::app("com.x", "X"));
        catalog.set_shortcuts("com.x", vec![LeafItem::shortcut("com.x", "s1", "S1")]);

        assert!(catalog.lookup_shortcut("com.x", "s1").await.is_some());
        catalog.uninstall_app("com.x");
        assert!(catalog.lookup_shortcut("com.x", "s1").await.is_none());
        assert!(catalog.list_leaf_apps().await.is_empty());
    }
}
