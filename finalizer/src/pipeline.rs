//! Fetch, place and project orchestration.
//!
//! This module drives one finalization run up to, but not including, the
//! version-control step. It coordinates the artefact source, placement and
//! compatibility projection, and returns every path it touched so the commit
//! step stages exactly those.

use crate::artefact::extraction::SdkExtractor;
use crate::artefact::source::{ArtefactRequest, ArtefactSource, MODULES_INFO};
use crate::compat::project_api_files;
use crate::error::{FinalizeError, Result};
use crate::manifest::ModulesInfo;
use crate::output::write_stderr_line;
use crate::placement::{destination_subdir, place_sdk, remove_existing_dir, resolve_repository};
use crate::touched::TouchedPaths;
use crate::workspace::Layout;
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;

/// Prefix of the scratch directories artefacts are fetched into.
const SCRATCH_PREFIX: &str = "finalize-sdk-";

/// Context for a finalization run.
pub struct PipelineContext<'a> {
    /// Extension SDK version being finalized.
    pub version: u32,
    /// Module names to fetch, or [`crate::cli::ALL_MODULES`].
    pub modules: &'a [String],
    /// Where repositories live for this run.
    pub layout: &'a Layout,
    /// Where artefacts come from.
    pub source: &'a dyn ArtefactSource,
    /// How SDK archives are unpacked.
    pub extractor: &'a dyn SdkExtractor,
}

/// Imports every requested SDK into its prebuilt repository and refreshes the
/// API snapshot for `context.version`.
///
/// The previous snapshot directory is removed before anything is fetched.
/// Fetched artefacts are left in scratch directories for inspection.
///
/// # Errors
///
/// Returns the first failure from retrieval, the manifest, routing,
/// extraction or projection. Nothing is rolled back.
pub fn finalize_prebuilts(
    context: &PipelineContext<'_>,
    stderr: &mut dyn Write,
) -> Result<TouchedPaths> {
    let compat_repo = context.layout.compat_repo();
    let snapshot_dir = Layout::compat_version_dir(context.version);
    remove_existing_dir(&compat_repo.join(&snapshot_dir), stderr)?;

    let modules_info = fetch_modules_info(context.source, stderr)?;
    log::debug!("loaded {} module(s) from modules-info", modules_info.len());

    let mut touched = TouchedPaths::new();
    for module in context.modules {
        let fetched = scratch_dir()?;
        context.source.fetch(
            &ArtefactRequest::Sdks {
                module: module.clone(),
            },
            &fetched,
            stderr,
        )?;

        for archive in fetched_files(&fetched)? {
            let Some(filename) = archive.file_name() else {
                continue;
            };
            let repo = resolve_repository(filename, &modules_info, context.layout, stderr)?;
            let subdir = destination_subdir(filename, context.version);
            let target_dir = repo.join(&subdir);

            place_sdk(&archive, &target_dir, context.extractor, stderr)?;
            touched.record(&repo, &subdir);

            let copied = project_api_files(&target_dir, &compat_repo, &snapshot_dir, &mut touched)?;
            log::debug!("projected {copied} API file(s) from {filename}");
        }
    }

    if touched.is_empty() {
        write_stderr_line(stderr, "No SDK archives were retrieved.");
    }
    Ok(touched)
}

fn fetch_modules_info(source: &dyn ArtefactSource, stderr: &mut dyn Write) -> Result<ModulesInfo> {
    let dir = scratch_dir()?;
    source.fetch(&ArtefactRequest::ModulesInfo, &dir, stderr)?;
    ModulesInfo::load(&dir.join(MODULES_INFO))
}

/// Creates a fresh directory that outlives the run.
fn scratch_dir() -> Result<Utf8PathBuf> {
    let dir = tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .tempdir()?
        .keep();
    Utf8PathBuf::try_from(dir).map_err(|err| FinalizeError::NonUtf8Path {
        path: err.into_path_buf().display().to_string(),
    })
}

/// Lists the regular files directly in `dir`, sorted by name.
fn fetched_files(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let mut files = Vec::new();
    for entry in dir.read_dir_utf8()? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
