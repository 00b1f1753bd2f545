//! Tool configuration.
//!
//! `FinalizeConfig` holds the locations the finalizer relies on: the
//! artifact-fetch tool, the compatibility repository and its changelog, and
//! the root used for managed runs. Every field falls back to its default when
//! omitted, so a configuration file only needs to name what it overrides.

use crate::error::{FinalizeError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

/// Default location of the artifact-fetch tool.
pub const DEFAULT_FETCH_ARTIFACT: &str = "/google/data/ro/projects/android/fetch_artifact";

/// Default compatibility-tracking repository, relative to the tree root.
pub const DEFAULT_COMPAT_REPO: &str = "prebuilts/sdk";

/// Default changelog, relative to the compatibility repository.
pub const DEFAULT_COMPAT_README: &str = "extensions/README.md";

/// Default root for managed runs.
pub const DEFAULT_MANAGED_ROOT: &str = "/tmp";

/// Locations used by a finalization run.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FinalizeConfig {
    /// Path of the artifact-fetch tool.
    pub fetch_artifact: Utf8PathBuf,
    /// Compatibility-tracking repository, relative to the tree root.
    pub compat_repo: Utf8PathBuf,
    /// Changelog appended on commit, relative to `compat_repo`.
    pub compat_readme: Utf8PathBuf,
    /// Root that replaces the tree root in managed mode.
    pub managed_root: Utf8PathBuf,
}

impl Default for FinalizeConfig {
    fn default() -> Self {
        Self {
            fetch_artifact: Utf8PathBuf::from(DEFAULT_FETCH_ARTIFACT),
            compat_repo: Utf8PathBuf::from(DEFAULT_COMPAT_REPO),
            compat_readme: Utf8PathBuf::from(DEFAULT_COMPAT_README),
            managed_root: Utf8PathBuf::from(DEFAULT_MANAGED_ROOT),
        }
    }
}

impl FinalizeConfig {
    /// Loads the configuration from `path`, or returns the defaults when no
    /// path is given.
    ///
    /// # Errors
    ///
    /// Returns [`FinalizeError::ConfigRead`] if the file cannot be read and
    /// [`FinalizeError::InvalidConfig`] if it does not parse.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        let Some(config_path) = path else {
            return Ok(Self::default());
        };
        let contents =
            std::fs::read_to_string(config_path).map_err(|source| FinalizeError::ConfigRead {
                path: config_path.to_owned(),
                source,
            })?;
        Self::parse(config_path, &contents)
    }

    /// Parses configuration text read from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FinalizeError::InvalidConfig`] on malformed TOML or unknown
    /// keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use finalize_sdk::config::FinalizeConfig;
    ///
    /// let config = FinalizeConfig::parse(
    ///     Utf8Path::new("finalize.toml"),
    ///     "fetch_artifact = \"/opt/bin/fetch_artifact\"",
    /// )?;
    /// assert_eq!(config.fetch_artifact, "/opt/bin/fetch_artifact");
    /// assert_eq!(config.compat_repo, "prebuilts/sdk");
    /// # Ok::<(), finalize_sdk::error::FinalizeError>(())
    /// ```
    pub fn parse(path: &Utf8Path, contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|err| FinalizeError::InvalidConfig {
            path: path.to_owned(),
            reason: err.to_string(),
        })
    }
}
