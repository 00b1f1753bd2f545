//! Mainline modules-info manifest.
//!
//! The build publishes `mainline-modules-info.json`, a JSON object mapping
//! each module name to the SDK name its archives carry and the prebuilt
//! repository they belong in:
//!
//! ```json
//! {
//!   "art": { "sdk_name": "art-module-sdk", "module_sdk_project": "prebuilts/module_sdk/art" }
//! }
//! ```
//!
//! Entries keep document order, which decides ties during repository
//! resolution. Unknown per-entry fields are ignored.

use crate::error::{FinalizeError, Result};
use camino::Utf8Path;
use camino::Utf8PathBuf;
use serde::Deserialize;

/// Routing record for one module.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ModuleInfo {
    /// Module identifier (the JSON key).
    #[serde(skip)]
    pub name: String,
    /// Substring identifying the module's SDK archives.
    pub sdk_name: String,
    /// Destination prebuilt repository, relative to the tree root.
    pub module_sdk_project: Utf8PathBuf,
}

/// Ordered module routing table.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ModulesInfo {
    modules: Vec<ModuleInfo>,
}

impl ModulesInfo {
    /// Builds a table from already-parsed entries, keeping their order.
    #[cfg(any(test, feature = "test-support"))]
    #[must_use]
    pub const fn new(modules: Vec<ModuleInfo>) -> Self {
        Self { modules }
    }

    /// Reads and parses the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FinalizeError::Io`] if the file cannot be read and
    /// [`FinalizeError::InvalidModulesInfo`] if it is malformed.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(path, &contents)
    }

    /// Parses modules-info JSON; `path` is only used for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`FinalizeError::InvalidModulesInfo`] when the document is not
    /// an object of `{sdk_name, module_sdk_project}` records.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use finalize_sdk::manifest::ModulesInfo;
    ///
    /// let info = ModulesInfo::parse(
    ///     Utf8Path::new("mainline-modules-info.json"),
    ///     r#"{"foo": {"sdk_name": "foo-sdk", "module_sdk_project": "prebuilts/module_foo"}}"#,
    /// )?;
    /// assert_eq!(info.iter().next().map(|m| m.name.as_str()), Some("foo"));
    /// # Ok::<(), finalize_sdk::error::FinalizeError>(())
    /// ```
    pub fn parse(path: &Utf8Path, contents: &str) -> Result<Self> {
        let invalid = |reason: String| FinalizeError::InvalidModulesInfo {
            path: path.to_owned(),
            reason,
        };
        let document: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(contents).map_err(|err| invalid(err.to_string()))?;

        let modules = document
            .into_iter()
            .map(|(name, value)| {
                let mut module: ModuleInfo = serde_json::from_value(value)
                    .map_err(|err| invalid(format!("module {name}: {err}")))?;
                module.name = name;
                Ok(module)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { modules })
    }

    /// Iterates over the modules in document order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleInfo> {
        self.modules.iter()
    }

    /// Returns the first module whose `sdk_name` occurs in `filename`.
    #[must_use]
    pub fn module_for_archive(&self, filename: &str) -> Option<&ModuleInfo> {
        self.modules
            .iter()
            .find(|module| filename.contains(module.sdk_name.as_str()))
    }

    /// Returns the number of modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` when the table has no modules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
