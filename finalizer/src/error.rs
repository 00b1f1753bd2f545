//! Error types for the SDK finalization tool.
//!
//! Every failure is fatal: the binary prints the error on one line of stderr
//! and exits with status 1. Variants carry enough context for the operator to
//! re-run with corrected inputs.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::artefact::extraction::ExtractionError;

/// Errors that can occur while finalizing an extension SDK.
#[derive(Debug, Error)]
pub enum FinalizeError {
    /// An SDK archive name does not contain any module's `sdk_name`.
    #[error("\"{filename}\" has no valid mapping to any mainline module.")]
    UnmappedArtefact {
        /// File name of the unmapped archive.
        filename: String,
    },

    /// The artifact-fetch tool exited non-zero or could not be started.
    #[error("FAIL: Unable to retrieve {artefact} artifact for build ID {build_id} for {target} target")]
    RetrievalFailed {
        /// Path pattern that was requested.
        artefact: String,
        /// Build server build identifier.
        build_id: String,
        /// Build target the artifact was requested from.
        target: String,
    },

    /// The tool was not started from the top of an Android source tree.
    #[error("This script must be run from the top of an Android source tree.")]
    NotSourceTree {
        /// Directory that was checked.
        path: Utf8PathBuf,
    },

    /// Amend mode was requested but HEAD has no `Change-Id:` footer.
    #[error("FAIL: Unable to find change_id of the last commit in {repo}.")]
    MissingChangeId {
        /// Repository whose HEAD commit was inspected.
        repo: Utf8PathBuf,
    },

    /// The modules-info document is not the expected JSON shape.
    #[error("invalid modules info at {path}: {reason}")]
    InvalidModulesInfo {
        /// Path of the parsed document.
        path: Utf8PathBuf,
        /// Description of the parse error.
        reason: String,
    },

    /// An SDK archive could not be extracted.
    #[error("failed to extract {archive}: {source}")]
    Extraction {
        /// Archive being extracted.
        archive: Utf8PathBuf,
        /// Underlying extraction error.
        #[source]
        source: ExtractionError,
    },

    /// The extracted SDK has no `Android.bp` to disable.
    #[error("build metadata file missing from extracted SDK: {path}")]
    MissingBuildFile {
        /// Expected location of the file.
        path: Utf8PathBuf,
    },

    /// A `repo` or `git` invocation failed.
    #[error("{operation} failed: {message}")]
    VersionControl {
        /// The command that failed (`repo start`, `git add`, ...).
        operation: &'static str,
        /// Captured stderr of the failing command.
        message: String,
    },

    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`crate::config::FinalizeConfig`].
    #[error("invalid config {path}: {reason}")]
    InvalidConfig {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Description of the parse error.
        reason: String,
    },

    /// A path on disk is not valid UTF-8.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },

    /// The command line cannot be rendered for the commit message.
    #[error("cannot quote command line: {reason}")]
    CommandLine {
        /// Description of the quoting error.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

/// Result type alias using [`FinalizeError`].
pub type Result<T> = std::result::Result<T, FinalizeError>;
