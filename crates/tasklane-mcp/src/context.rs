//! Workspace context management for the MCP server.
//!
//! This module handles:
//! - Workspace detection (walking up to find `.tasklane/`)
//! - Path canonicalization
//! - Per-workspace engine instance management
//!
//! Each cached workspace owns one [`Engine`]; the engine serializes its own
//! writes and re-reads the data file before every call, so callers only hold
//! the context lock long enough to clone the `Arc` and CLI edits made while
//! the server runs are not lost.

use crate::error::{Error, Result};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tasklane::Engine;
use tasklane::config::{CONFIG_FILE_NAME, TASKLANE_DIR_NAME, TasklaneConfig, find_root};
use tasklane::store::load_from_jsonl;
use tracing::{debug, warn};

/// Maximum number of cached workspaces to prevent resource exhaustion.
///
/// When this limit is reached, the oldest workspace is evicted from cache.
const MAX_CACHED_WORKSPACES: usize = 32;

/// A loaded workspace: its engine plus the settings it was opened with.
#[derive(Debug)]
pub struct Workspace {
    /// Engine over the workspace's data file.
    pub engine: Engine,
    /// Resolved path of the data file.
    pub data_path: PathBuf,
    /// Workspace configuration.
    pub config: TasklaneConfig,
}

/// Global context state for the MCP server.
#[derive(Debug, Default)]
pub struct Context {
    /// The current active workspace root.
    current_workspace: Option<PathBuf>,

    /// Per-workspace state (limited to [`MAX_CACHED_WORKSPACES`]).
    workspace_cache: HashMap<PathBuf, Arc<Workspace>>,

    /// Insertion order for FIFO cache eviction.
    cache_order: VecDeque<PathBuf>,
}

impl Context {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current workspace root.
    ///
    /// This will:
    /// 1. Canonicalize the path (resolves `..`, symlinks, validates existence)
    /// 2. Verify a `.tasklane/` directory exists
    /// 3. Load the config and data file, unless the workspace is cached
    ///
    /// # Errors
    ///
    /// Returns an error if the path doesn't exist, has no `.tasklane/`
    /// directory, or its config or data file cannot be read.
    pub async fn set_workspace(&mut self, workspace_root: &Path) -> Result<WorkspaceInfo> {
        debug!(path = %workspace_root.display(), "Setting workspace");

        let canonical = workspace_root
            .canonicalize()
            .map_err(|e| Error::WorkspaceNotFound {
                path: workspace_root.display().to_string(),
                source: Some(e),
            })?;
        validate_path(&canonical)?;

        let tasklane_dir = canonical.join(TASKLANE_DIR_NAME);
        if !tasklane_dir.is_dir() {
            debug!(path = %tasklane_dir.display(), "No .tasklane directory found");
            return Err(Error::NoTasklaneDirectory(canonical.display().to_string()));
        }

        let mut warnings = Vec::new();
        if let Some(workspace) = self.workspace_cache.get(&canonical) {
            debug!("Using cached workspace");
            let data_path = workspace.data_path.clone();
            self.current_workspace = Some(canonical.clone());
            return Ok(WorkspaceInfo {
                workspace_root: canonical,
                data_path,
                warnings,
            });
        }

        let config_path = tasklane_dir.join(CONFIG_FILE_NAME);
        let config = TasklaneConfig::load(&config_path)
            .await
            .map_err(|e| Error::ConfigLoad {
                path: config_path.display().to_string(),
                reason: e.to_string(),
            })?;

        let data_path = config.data_path(&canonical);
        let (store, load_warnings) = load_from_jsonl(&data_path).await?;
        for warning in &load_warnings {
            warn!(%warning, workspace = %canonical.display(), "Data file problem");
            warnings.push(warning.to_string());
        }

        while self.workspace_cache.len() >= MAX_CACHED_WORKSPACES {
            self.evict_oldest();
        }
        self.workspace_cache.insert(
            canonical.clone(),
            Arc::new(Workspace {
                engine: Engine::new(Arc::new(store)),
                data_path: data_path.clone(),
                config,
            }),
        );
        self.cache_order.push_back(canonical.clone());
        self.current_workspace = Some(canonical.clone());

        Ok(WorkspaceInfo {
            workspace_root: canonical,
            data_path,
            warnings,
        })
    }

    /// Evict the oldest cached workspace to make room for new entries.
    fn evict_oldest(&mut self) {
        if let Some(oldest) = self.cache_order.pop_front() {
            self.workspace_cache.remove(&oldest);
            if self.current_workspace.as_ref() == Some(&oldest) {
                self.current_workspace = None;
            }
            debug!(workspace = %oldest.display(), "Evicted workspace from cache");
        }
    }

    /// Get the current workspace root.
    #[must_use]
    pub fn current_workspace(&self) -> Option<&PathBuf> {
        self.current_workspace.as_ref()
    }

    /// Get the data file path for the current workspace.
    #[must_use]
    pub fn current_data_path(&self) -> Option<&PathBuf> {
        self.current_workspace
            .as_ref()
            .and_then(|ws| self.workspace_cache.get(ws))
            .map(|ws| &ws.data_path)
    }

    /// Get a specific workspace, or the current one if not specified.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No context is set and no workspace path is provided
    /// - The workspace path doesn't exist
    /// - The workspace exists but wasn't initialized via `set_workspace()`
    pub fn workspace_for(&self, workspace_root: Option<&Path>) -> Result<Arc<Workspace>> {
        let workspace = match workspace_root {
            Some(path) => path.canonicalize().map_err(|e| Error::WorkspaceNotFound {
                path: path.display().to_string(),
                source: Some(e),
            })?,
            None => self.current_workspace.clone().ok_or(Error::NoContext)?,
        };

        self.workspace_cache
            .get(&workspace)
            .cloned()
            .ok_or_else(|| Error::WorkspaceNotInitialized(workspace.display().to_string()))
    }

    /// Discover and set the workspace by walking up from the given directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no `.tasklane/` directory is found in the path
    /// hierarchy, or if loading the workspace fails.
    pub async fn discover_and_set_workspace(&mut self, start: &Path) -> Result<WorkspaceInfo> {
        let workspace_root = discover_workspace(start)?;
        self.set_workspace(&workspace_root).await
    }

    /// Install a workspace backed by the given engine, bypassing discovery.
    #[cfg(test)]
    pub fn set_test_workspace(&mut self, workspace_root: PathBuf, engine: Engine) {
        self.current_workspace = Some(workspace_root.clone());
        self.workspace_cache.insert(
            workspace_root.clone(),
            Arc::new(Workspace {
                engine,
                data_path: PathBuf::from("test://memory"),
                config: TasklaneConfig::default(),
            }),
        );
        self.cache_order.push_back(workspace_root);
    }

    /// Get the number of cached workspaces (for testing).
    #[cfg(test)]
    #[must_use]
    pub fn cache_size(&self) -> usize {
        self.workspace_cache.len()
    }
}

/// Information about a workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceInfo {
    /// The canonical path to the workspace root.
    pub workspace_root: PathBuf,

    /// The path to the data file.
    pub data_path: PathBuf,

    /// Problems found while reading the data file.
    pub warnings: Vec<String>,
}

/// Validate that a path is safe to use as a workspace.
///
/// The path must be absolute, free of null bytes, and free of `..`
/// components.
fn validate_path(path: &Path) -> Result<()> {
    if !path.is_absolute() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Workspace path must be absolute",
        )));
    }

    if path.to_string_lossy().contains('\0') {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Workspace path contains invalid characters",
        )));
    }

    if path
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Workspace path contains parent directory references",
        )));
    }

    Ok(())
}

/// Discover a tasklane workspace by walking up from the given directory.
///
/// Returns the canonicalized workspace root (directory containing `.tasklane/`).
///
/// # Errors
///
/// Returns `Error::NoTasklaneDirectory` if no `.tasklane/` directory is found,
/// or `Error::WorkspaceNotFound` if the path cannot be canonicalized.
pub fn discover_workspace(start: &Path) -> Result<PathBuf> {
    let root = find_root(start)
        .ok_or_else(|| Error::NoTasklaneDirectory(start.display().to_string()))?;

    // Resolve symlinks (e.g., /var -> /private/var on macOS)
    root.canonicalize().map_err(|e| Error::WorkspaceNotFound {
        path: root.display().to_string(),
        source: Some(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklane::store::InMemoryTaskStore;
    use tempfile::TempDir;

    fn memory_engine() -> Engine {
        Engine::new(Arc::new(InMemoryTaskStore::new()))
    }

    #[test]
    fn test_discover_workspace() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".tasklane")).unwrap();

        let result = discover_workspace(temp.path()).unwrap();
        assert_eq!(result, temp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_discover_workspace_not_found() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            discover_workspace(temp.path()),
            Err(Error::NoTasklaneDirectory(_))
        ));
    }

    #[test]
    fn test_discover_workspace_from_nested_dir() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".tasklane")).unwrap();
        let subdir = temp.path().join("src").join("nested").join("deep");
        std::fs::create_dir_all(&subdir).unwrap();

        let result = discover_workspace(&subdir).unwrap();
        assert_eq!(result, temp.path().canonicalize().unwrap());
    }

    #[tokio::test]
    async fn test_set_workspace_loads_data_file() {
        let temp = TempDir::new().unwrap();
        tasklane::config::init(temp.path()).await.unwrap();

        let mut context = Context::new();
        let info = context.set_workspace(temp.path()).await.unwrap();

        assert_eq!(info.workspace_root, temp.path().canonicalize().unwrap());
        assert!(info.data_path.ends_with(".tasklane/tasks.jsonl"));
        assert!(info.warnings.is_empty());
        assert_eq!(context.current_data_path(), Some(&info.data_path));
    }

    #[tokio::test]
    async fn test_discover_and_set_workspace_from_subdir() {
        let temp = TempDir::new().unwrap();
        tasklane::config::init(temp.path()).await.unwrap();
        let subdir = temp.path().join("docs");
        std::fs::create_dir(&subdir).unwrap();

        let mut context = Context::new();
        let info = context.discover_and_set_workspace(&subdir).await.unwrap();
        assert_eq!(info.workspace_root, temp.path().canonicalize().unwrap());
        assert!(context.workspace_for(None).is_ok());
    }

    #[tokio::test]
    async fn test_set_workspace_without_tasklane_dir() {
        let temp = TempDir::new().unwrap();
        let mut context = Context::new();

        let err = context.set_workspace(temp.path()).await.unwrap_err();
        assert!(matches!(err, Error::NoTasklaneDirectory(_)));
        assert!(context.current_workspace().is_none());
    }

    #[test]
    fn test_workspace_for_uninitialized_workspace() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".tasklane")).unwrap();

        let context = Context::new();
        match context.workspace_for(Some(temp.path())) {
            Err(Error::WorkspaceNotInitialized(_)) => {}
            Err(e) => panic!("Expected WorkspaceNotInitialized, got {e:?}"),
            Ok(_) => panic!("Expected error, got Ok"),
        }
    }

    #[test]
    fn test_workspace_for_without_context() {
        let context = Context::new();
        assert!(matches!(context.workspace_for(None), Err(Error::NoContext)));
    }

    #[test]
    fn test_workspace_for_nonexistent_path() {
        let context = Context::new();
        let result = context.workspace_for(Some(Path::new("/nonexistent/path/to/workspace")));
        assert!(matches!(result, Err(Error::WorkspaceNotFound { .. })));
    }

    #[test]
    fn test_validate_path_rejects_relative() {
        assert!(validate_path(Path::new("relative/path")).is_err());
    }

    #[test]
    fn test_validate_path_accepts_absolute() {
        assert!(validate_path(&std::env::temp_dir()).is_ok());
    }

    #[test]
    fn test_evict_oldest() {
        let mut context = Context::new();
        for i in 0..3 {
            context.set_test_workspace(PathBuf::from(format!("/test/workspace{i}")), memory_engine());
        }
        assert_eq!(context.cache_size(), 3);

        context.evict_oldest();
        assert_eq!(context.cache_size(), 2);
        assert_eq!(context.cache_order.len(), 2);
        assert!(context.current_workspace().is_some());

        context.evict_oldest();
        context.evict_oldest();
        assert_eq!(context.cache_size(), 0);
        // The current workspace went with the last eviction.
        assert!(context.current_workspace().is_none());

        // Evicting from empty cache is a no-op
        context.evict_oldest();
        assert_eq!(context.cache_size(), 0);
    }

    #[tokio::test]
    async fn test_cache_is_bounded() {
        let mut context = Context::new();
        for i in 0..MAX_CACHED_WORKSPACES {
            context.set_test_workspace(PathBuf::from(format!("/test/workspace{i}")), memory_engine());
        }

        let temp = TempDir::new().unwrap();
        tasklane::config::init(temp.path()).await.unwrap();
        context.set_workspace(temp.path()).await.unwrap();

        assert_eq!(context.cache_size(), MAX_CACHED_WORKSPACES);
        assert!(
            context
                .workspace_for(Some(Path::new("/test/workspace0")))
                .is_err()
        );
    }
}
