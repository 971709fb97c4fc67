//! Workspace configuration and initialization.
//!
//! A workspace is any directory containing `.tasklane/`. The config file
//! names the data file and the default rendering settings.

use crate::domain::BoardId;
use crate::error::{Error, Result};
use crate::render::RenderFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the tasklane directory
pub const TASKLANE_DIR_NAME: &str = ".tasklane";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the task data file
pub const DATA_FILE_NAME: &str = "tasks.jsonl";

/// Maximum directory depth to traverse when searching for a workspace root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct TasklaneConfig {
    /// Path to the JSONL data file, relative to the workspace root
    pub data_file: String,

    /// Board that critical-path and graph use when none is given
    #[serde(default)]
    pub board: Option<BoardId>,

    /// Rendering defaults
    #[serde(default)]
    pub render: RenderConfig,
}

/// Rendering defaults section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct RenderConfig {
    /// Default visualization format
    #[serde(default)]
    pub format: RenderFormat,

    /// Show id, status, estimate and due date by default
    #[serde(default)]
    pub show_task_details: bool,
}

impl TasklaneConfig {
    /// Load configuration from a file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.data_file.trim().is_empty() {
            return Err(Error::Config("data-file cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Resolve the data file against the workspace root.
    #[must_use]
    pub fn data_path(&self, root: &Path) -> PathBuf {
        let path = Path::new(&self.data_file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }
}

impl Default for TasklaneConfig {
    fn default() -> Self {
        Self {
            data_file: format!("{TASKLANE_DIR_NAME}/{DATA_FILE_NAME}"),
            board: None,
            render: RenderConfig::default(),
        }
    }
}

/// Result of [`init`]
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created `.tasklane` directory
    pub tasklane_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created data file
    pub data_file: PathBuf,
}

/// Initialize a workspace in `base_dir`.
///
/// # Errors
///
/// Returns `Error::Config` if `.tasklane/` already exists, or an I/O error.
pub async fn init(base_dir: &Path) -> Result<InitResult> {
    let tasklane_dir = base_dir.join(TASKLANE_DIR_NAME);
    if tasklane_dir.exists() {
        return Err(Error::Config(format!(
            "tasklane is already initialized in this directory. Found existing '{TASKLANE_DIR_NAME}'"
        )));
    }

    fs::create_dir_all(&tasklane_dir).await?;

    let config_file = tasklane_dir.join(CONFIG_FILE_NAME);
    let config = TasklaneConfig::default();
    config.save(&config_file).await?;

    let data_file = config.data_path(base_dir);
    fs::write(&data_file, "").await?;

    Ok(InitResult {
        tasklane_dir,
        config_file,
        data_file,
    })
}

/// Find the workspace root by searching up the directory tree.
///
/// Returns the directory containing `.tasklane/`, or `None` if the search
/// reaches the filesystem root or [`MAX_TRAVERSAL_DEPTH`] first.
pub fn find_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(TASKLANE_DIR_NAME).is_dir() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
