//! Index of directories written during a run.
//!
//! Maps each repository to the paths (relative to it) that were created or
//! replaced. The commit step stages exactly these paths.

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::{BTreeMap, BTreeSet};

/// Repository → relative paths touched in it. Only ever grows.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TouchedPaths {
    repos: BTreeMap<Utf8PathBuf, BTreeSet<Utf8PathBuf>>,
}

impl TouchedPaths {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `relative` as touched inside `repo`.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use finalize_sdk::touched::TouchedPaths;
    ///
    /// let mut touched = TouchedPaths::new();
    /// touched.record(Utf8Path::new("prebuilts/sdk"), Utf8Path::new("extensions/5/public/api"));
    /// touched.record(Utf8Path::new("prebuilts/sdk"), Utf8Path::new("extensions/5/public/api"));
    /// assert_eq!(touched.paths(Utf8Path::new("prebuilts/sdk")).count(), 1);
    /// ```
    pub fn record(&mut self, repo: &Utf8Path, relative: &Utf8Path) {
        self.repos
            .entry(repo.to_owned())
            .or_default()
            .insert(relative.to_owned());
    }

    /// Iterates over the touched repositories in path order.
    pub fn repos(&self) -> impl Iterator<Item = &Utf8Path> {
        self.repos.keys().map(Utf8PathBuf::as_path)
    }

    /// Iterates over the paths touched in `repo`.
    pub fn paths(&self, repo: &Utf8Path) -> impl Iterator<Item = &Utf8Path> {
        self.repos
            .get(repo)
            .into_iter()
            .flat_map(|paths| paths.iter().map(Utf8PathBuf::as_path))
    }

    /// Returns `true` when nothing was touched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }
}
