//! Source tree detection and output layout.
//!
//! Normal runs write into the Android source tree the tool was started from.
//! Managed runs have no checkout, so every repository path is redirected under
//! the configured managed root instead.

use crate::config::FinalizeConfig;
use crate::error::{FinalizeError, Result};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Directory whose presence marks the top of an Android source tree.
const SOURCE_TREE_MARKER: &str = "build/soong";

/// Checks whether `dir` is the top of an Android source tree.
#[must_use]
pub fn is_source_tree(dir: &Utf8Path) -> bool {
    dir.join(SOURCE_TREE_MARKER).is_dir()
}

/// Fails unless `dir` is the top of an Android source tree.
///
/// # Errors
///
/// Returns [`FinalizeError::NotSourceTree`] when the marker directory is
/// missing.
pub fn ensure_source_tree(dir: &Utf8Path) -> Result<()> {
    if is_source_tree(dir) {
        Ok(())
    } else {
        Err(FinalizeError::NotSourceTree {
            path: dir.to_owned(),
        })
    }
}

/// Returns the current directory as a UTF-8 path.
///
/// # Errors
///
/// Returns an error if the current directory cannot be read or is not UTF-8.
pub fn current_dir_utf8() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir()?;
    Utf8PathBuf::try_from(cwd).map_err(|err| FinalizeError::NonUtf8Path {
        path: err.into_path_buf().display().to_string(),
    })
}

/// Where repositories live for this run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    root: Utf8PathBuf,
    managed: bool,
    compat_repo: Utf8PathBuf,
    compat_readme: Utf8PathBuf,
}

impl Layout {
    /// Creates a layout rooted at the source tree `tree_root`, or at the
    /// configured managed root when `managed` is set.
    #[must_use]
    pub fn new(tree_root: &Utf8Path, managed: bool, config: &FinalizeConfig) -> Self {
        let root = if managed {
            config.managed_root.clone()
        } else {
            tree_root.to_owned()
        };
        Self {
            root,
            managed,
            compat_repo: config.compat_repo.clone(),
            compat_readme: config.compat_readme.clone(),
        }
    }

    /// Returns the directory every repository path is resolved against.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns `true` for managed runs.
    #[must_use]
    pub const fn is_managed(&self) -> bool {
        self.managed
    }

    /// Resolves a repository path from the modules-info manifest.
    ///
    /// Managed runs keep absolute projects under the managed root.
    #[must_use]
    pub fn repository(&self, project: &Utf8Path) -> Utf8PathBuf {
        self.resolve(project)
    }

    /// Returns the compatibility-tracking repository.
    #[must_use]
    pub fn compat_repo(&self) -> Utf8PathBuf {
        self.resolve(&self.compat_repo)
    }

    fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        if !self.managed {
            return self.root.join(path);
        }
        let relative: Utf8PathBuf = path
            .components()
            .filter(|component| {
                !matches!(component, Utf8Component::RootDir | Utf8Component::Prefix(_))
            })
            .collect();
        self.root.join(relative)
    }

    /// Returns the changelog path relative to the compatibility repository.
    #[must_use]
    pub fn compat_readme(&self) -> &Utf8Path {
        &self.compat_readme
    }

    /// Returns the directory holding the API snapshot for `version`,
    /// relative to the compatibility repository.
    #[must_use]
    pub fn compat_version_dir(version: u32) -> Utf8PathBuf {
        Utf8PathBuf::from("extensions").join(version.to_string())
    }
}
