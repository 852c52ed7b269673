//! Store configuration.

use std::path::PathBuf;

/// Default database directory, relative to the working directory.
pub const DEFAULT_ROOT: &str = "./memory_database";

/// Configuration for a file-backed memory store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding one subdirectory per tier.
    pub root: PathBuf,
    /// Whether opening the store creates missing tier directories.
    pub create_dirs: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            create_dirs: true,
        }
    }
}

impl StoreConfig {
    /// Create a configuration rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// - `MEMTIER_ROOT`: store root, `~` is expanded
    /// - `MEMTIER_CREATE_DIRS`: `0` or `false` disables directory creation
    pub fn from_env() -> Self {
        Self {
            root: std::env::var("MEMTIER_ROOT")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|s| expand_root(&s))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT)),
            create_dirs: std::env::var("MEMTIER_CREATE_DIRS")
                .map(|s| s != "0" && s.to_lowercase() != "false")
                .unwrap_or(true),
        }
    }

    /// Override the root directory.
    pub fn with_root(mut self, root: impl AsRef<str>) -> Self {
        self.root = expand_root(root.as_ref());
        self
    }

    /// Set whether tier directories are created on open.
    pub fn with_create_dirs(mut self, create_dirs: bool) -> Self {
        self.create_dirs = create_dirs;
        self
    }
}

fn expand_root(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}
