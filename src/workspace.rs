//! Harness directory layout.
//!
//! All state lives under a single root: `configs/` holds the declarative
//! configuration, `external/` the cloned repositories, caches and
//! produced boot artifacts. The root is found by walking upward from the
//! current directory until `configs/repos.yaml` appears, or taken from
//! the `CHERIDEMO_ROOT` environment variable.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, ConfigError};

/// Environment variable overriding root discovery.
pub const ROOT_ENV: &str = "CHERIDEMO_ROOT";

/// Marker file that identifies the harness root.
const ROOT_MARKER: &str = "configs/repos.yaml";

/// Resolved directory layout of one harness checkout.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Locate the harness root from `CHERIDEMO_ROOT` or by walking up
    /// from the current directory.
    pub fn discover() -> Result<Self, ConfigError> {
        if let Ok(root) = env::var(ROOT_ENV) {
            let root = PathBuf::from(root);
            if root.join(ROOT_MARKER).exists() {
                return Ok(Workspace { root });
            }
            return Err(ConfigError::RootNotFound(root.display().to_string()));
        }

        let cwd = env::current_dir().map_err(ConfigError::Io)?;
        find_root_from(&cwd)
            .map(|root| Workspace { root })
            .ok_or_else(|| ConfigError::RootNotFound(cwd.display().to_string()))
    }

    /// Use an explicit root, bypassing discovery.
    pub fn at_root(root: impl Into<PathBuf>) -> Self {
        Workspace { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join("configs")
    }

    /// Directory holding all cloned upstream repositories.
    pub fn external_dir(&self) -> PathBuf {
        self.root.join("external")
    }

    /// Checkout directory of one configured repository.
    pub fn repo_dir(&self, name: &str) -> PathBuf {
        self.external_dir().join(name)
    }

    /// Download cache (toolchain tarballs).
    pub fn cache_dir(&self) -> PathBuf {
        self.external_dir().join("cache")
    }

    /// Install root for downloaded cross toolchains.
    pub fn toolchains_dir(&self) -> PathBuf {
        self.external_dir().join("toolchains")
    }

    /// Assembled boot images end up here.
    pub fn artifacts_dir(&self) -> PathBuf {
        self.external_dir().join("boot-artifacts")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.external_dir().join("logs")
    }

    /// Create the external/ tree if it is not there yet.
    pub fn ensure_external(&self) -> io::Result<()> {
        fs::create_dir_all(self.external_dir())
    }

    /// Resolve a configured repository checkout, failing with a hint to
    /// run `cheridemo clone` when it is absent.
    pub fn require_repo(&self, name: &str) -> Result<PathBuf, BuildError> {
        let dir = self.repo_dir(name);
        if dir.exists() {
            Ok(dir)
        } else {
            Err(BuildError::RepoMissing(name.to_string()))
        }
    }
}

/// Walk upward from `start` looking for the root marker.
pub(crate) fn find_root_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(ROOT_MARKER).exists() {
            return Some(current);
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => return None,
        }
    }
}
