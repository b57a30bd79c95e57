//! Tag Launcher Core
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: SQLite persistence of tags and their ordered items
//! - catalog: External collaborators (installed apps, system hooks)
//! - engine: Tag graph resolution and the live projections built on it
//! - config: Runtime configuration

use std::sync::Arc;

pub mod catalog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod repository;

pub use catalog::{InMemoryCatalog, ItemCatalog, SystemIntegration};
pub use config::{LauncherConfig, PopupMode};
pub use domain::{
    DomainError, DomainResult, LeafItem, LeafKey, LeafKind, ResolvedItem, Tag, TagItemRecord,
    TagItemVariant, UiRow, FAVORITES_TAG_ID, PINNED_TAG_ID,
};
pub use engine::{Action, ActionEffect, ActionOutcome, IndexGroup, TagEngine};
pub use repository::{open_db, DbState, StoreChange};

const APP_NAME: &str = "TagLauncher";

/// Open the store described by `config` and start an engine over it
///
/// Initializes rolling file logging first when `log_dir` is set. The
/// returned engine already follows committed store changes.
pub async fn open(
    config: LauncherConfig,
    catalog: Arc<dyn ItemCatalog>,
    system: Arc<dyn SystemIntegration>,
) -> DomainResult<Arc<TagEngine>> {
    if let Some(log_dir) = &config.log_dir {
        // Fails when a logger is already installed; keep going with that one
        if let Err(e) = rolling_logger::init_logger(log_dir, APP_NAME) {
            eprintln!(
                "[{}] Rolling logger not initialized: {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                e
            );
        }
    }

    let db = match open_db(&config.db_path, &config.favorites_name, &config.pinned_name).await {
        Ok(db) => db,
        Err(e) => {
            let _ = rolling_logger::error(&format!("DB init failed: {}", e));
            return Err(e);
        }
    };
    let _ = rolling_logger::info("DB init success");

    let engine = TagEngine::new(db, catalog, system, config);
    engine.watch_store();
    Ok(engine)
}
