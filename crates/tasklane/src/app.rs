//! Application context for CLI command execution.
//!
//! # Example
//!
//! ```no_run
//! use tasklane::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     let path = app.engine().critical_path(None).await?;
//!     println!("{} tasks on the critical path", path.tasks.len());
//!     Ok(())
//! }
//! ```

use crate::config::{CONFIG_FILE_NAME, TASKLANE_DIR_NAME, TasklaneConfig, find_root};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::store::{LoadWarning, load_from_jsonl};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Application context for CLI operations.
///
/// Finds the workspace, loads its configuration and data file, and wraps
/// the resulting store in an [`Engine`].
#[derive(Debug)]
pub struct App {
    engine: Engine,
    root: PathBuf,
    config: TasklaneConfig,
    warnings: Vec<LoadWarning>,
}

impl App {
    /// Create an App from the given working directory.
    ///
    /// Searches up the directory tree for `.tasklane/`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No workspace is found in the directory tree
    /// - Configuration cannot be loaded
    /// - The data file cannot be read
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root = find_root(working_dir).ok_or_else(|| {
            Error::Config("Not a tasklane workspace. Run 'tasklane init' first.".to_string())
        })?;

        let config_path = root.join(TASKLANE_DIR_NAME).join(CONFIG_FILE_NAME);
        let config = TasklaneConfig::load(&config_path).await?;

        let (store, warnings) = load_from_jsonl(&config.data_path(&root)).await?;
        for warning in &warnings {
            warn!(%warning, "Data file problem");
        }

        Ok(Self {
            engine: Engine::new(Arc::new(store)),
            root,
            config,
            warnings,
        })
    }

    /// The dependency engine.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Directory containing `.tasklane/`.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loaded configuration.
    #[must_use]
    pub fn config(&self) -> &TasklaneConfig {
        &self.config
    }

    /// Problems found while reading the data file.
    #[must_use]
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }
}
