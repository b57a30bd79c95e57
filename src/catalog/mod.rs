//! External Collaborators
//!
//! The item catalog (installed apps and their shortcuts) and the system
//! integration hooks live outside this crate; these traits are the seams.

mod memory;

use async_trait::async_trait;

use crate::domain::LeafItem;

pub use memory::InMemoryCatalog;

/// Live set of launchable leaf items
///
/// Implementations signal changes through `TagEngine::notify_catalog_changed`
/// and `TagEngine::notify_shortcuts_changed`.
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    /// Every installed application
    async fn list_leaf_apps(&self) -> Vec<LeafItem>;

    /// Shortcuts published by `package`; may be slow and may be empty
    async fn list_shortcuts(&self, package: &str) -> Vec<LeafItem>;

    async fn lookup_app(&self, catalog_key: &str) -> Option<LeafItem> {
        let apps = self.list_leaf_apps().await;
        let exact = apps.iter().position(|app| {
            matches!(&app.key, crate::domain::LeafKey::App { catalog_key: key } if key == catalog_key)
        });
        match exact {
            Some(index) => apps.into_iter().nth(index),
            None => apps.into_iter().find(|app| app.package() == catalog_key),
        }
    }

    async fn lookup_shortcut(&self, package: &str, shortcut_id: &str) -> Option<LeafItem> {
        self.list_shortcuts(package).await.into_iter().find(|shortcut| {
            matches!(&shortcut.key, crate::domain::LeafKey::Shortcut { shortcut_id: id, .. } if id == shortcut_id)
        })
    }
}

/// Fire-and-forget hooks into the host system
pub trait SystemIntegration: Send + Sync {
    fn open_settings_for(&self, item: &LeafItem);

    fn request_uninstall(&self, item: &LeafItem);

    fn launch(&self, item: &LeafItem);
}
