//! Runtime configuration
//!
//! Read from a JSON file; every field has a default so a partial (or
//! missing) file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::{DomainError, DomainResult};
use crate::repository::{DEFAULT_FAVORITES_NAME, DEFAULT_PINNED_NAME};

pub const DEFAULT_CYCLE_LABEL: &str = "Infinite loop detected";

/// Which children a tag's popup lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupMode {
    /// Every child, the representative included
    #[default]
    Inclusive,
    /// Every child except the first record, which the row already stands for
    ExcludeRepresentative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    pub db_path: PathBuf,
    /// Rolling log directory; logging is left to the embedder when unset
    pub log_dir: Option<PathBuf>,
    pub popup_mode: PopupMode,
    /// Label shown for rows that resolve to a cycle
    pub cycle_label: String,
    pub favorites_name: String,
    pub pinned_name: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("launcher.db"),
            log_dir: None,
            popup_mode: PopupMode::default(),
            cycle_label: DEFAULT_CYCLE_LABEL.to_string(),
            favorites_name: DEFAULT_FAVORITES_NAME.to_string(),
            pinned_name: DEFAULT_PINNED_NAME.to_string(),
        }
    }
}

impl LauncherConfig {
    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> DomainResult<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(DomainError::Unavailable(format!(
                    "Failed to read config {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&raw).map_err(|e| {
            DomainError::InvalidInput(format!("Invalid config {}: {}", path.display(), e))
        })
    }
}
