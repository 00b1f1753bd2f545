//! Extension SDK finalization library.
//!
//! This crate imports Mainline module SDK snapshots for a build into their
//! prebuilt repositories, refreshes the API snapshot kept in `prebuilts/sdk`
//! and commits the result. It is used by the `finalize-sdk` CLI binary and
//! can be driven programmatically for testing.
//!
//! # Modules
//!
//! - [`artefact`] - Artifact retrieval and SDK archive extraction
//! - [`cli`] - Command-line argument definitions
//! - [`commit`] - Commit message rendering and version-control steps
//! - [`compat`] - API file projection into the compatibility tree
//! - [`config`] - Tool location overrides
//! - [`error`] - Error types
//! - [`exec`] - External command execution
//! - [`flow`] - Mode selection for a whole run
//! - [`manifest`] - The modules-info routing table
//! - [`output`] - Progress output helpers
//! - [`pipeline`] - Fetch, place and project orchestration
//! - [`placement`] - Routing archives into prebuilt repositories
//! - [`touched`] - Index of paths written during a run
//! - [`workspace`] - Source tree detection and output layout

pub mod artefact;
pub mod cli;
pub mod commit;
pub mod compat;
pub mod config;
pub mod error;
pub mod exec;
pub mod flow;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod placement;
pub mod touched;
pub mod workspace;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
