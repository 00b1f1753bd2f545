//! Routing SDK archives into their prebuilt repositories.
//!
//! An archive's repository comes from the modules-info manifest; its
//! subdirectory comes from its file name. The destination is wiped before
//! extraction so a re-run replaces stale content instead of merging with it.

use crate::artefact::extraction::SdkExtractor;
use crate::error::{FinalizeError, Result};
use crate::manifest::ModulesInfo;
use crate::output::write_stderr_line;
use crate::workspace::Layout;
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;

/// Build metadata file shipped in every SDK snapshot.
pub const BUILD_FILE: &str = "Android.bp";

/// Name the build metadata file is kept under once disabled.
pub const DISABLED_BUILD_FILE: &str = "Android.bp.auto";

/// Finds the repository an SDK archive belongs in.
///
/// The first module, in manifest order, whose `sdk_name` occurs in
/// `filename` wins. In managed runs the directory is created, since no
/// checkout provides it.
///
/// # Errors
///
/// Returns [`FinalizeError::UnmappedArtefact`] when no module matches, or an
/// I/O error if the managed directory cannot be created.
pub fn resolve_repository(
    filename: &str,
    modules: &ModulesInfo,
    layout: &Layout,
    stderr: &mut dyn Write,
) -> Result<Utf8PathBuf> {
    let module = modules.module_for_archive(filename).ok_or_else(|| {
        FinalizeError::UnmappedArtefact {
            filename: filename.to_owned(),
        }
    })?;

    let repo = layout.repository(&module.module_sdk_project);
    if layout.is_managed() {
        std::fs::create_dir_all(&repo)?;
    }
    write_stderr_line(
        stderr,
        format!("module_sdk_path for {}: {repo}", module.name),
    );
    Ok(repo)
}

/// Returns the repository-relative directory an archive is extracted into.
///
/// # Examples
///
/// ```
/// use finalize_sdk::placement::destination_subdir;
///
/// assert_eq!(destination_subdir("art-module-test-exports-current.zip", 12), "12/test-exports");
/// assert_eq!(destination_subdir("art-module-host-exports-current.zip", 12), "12/host-exports");
/// assert_eq!(destination_subdir("art-module-sdk-current.zip", 12), "12");
/// ```
#[must_use]
pub fn destination_subdir(filename: &str, version: u32) -> Utf8PathBuf {
    let base = Utf8PathBuf::from(version.to_string());
    if filename.contains("test-exports") {
        return base.join("test-exports");
    }
    if filename.contains("host-exports") {
        return base.join("host-exports");
    }
    base
}

/// Removes `dir` and everything under it if it exists.
///
/// # Errors
///
/// Returns an I/O error if removal fails.
pub fn remove_existing_dir(dir: &Utf8Path, stderr: &mut dyn Write) -> Result<()> {
    if dir.is_dir() {
        write_stderr_line(stderr, format!("Removing existing dir {dir}"));
        std::fs::remove_dir_all(dir)?;
    }
    Ok(())
}

/// Replaces `target_dir` with the contents of `archive`.
///
/// The snapshot's `Android.bp` is renamed to `Android.bp.auto` so that the
/// build ignores it while keeping it for reference.
///
/// # Errors
///
/// Returns [`FinalizeError::Extraction`] if the archive cannot be unpacked,
/// [`FinalizeError::MissingBuildFile`] if it has no `Android.bp`, or an I/O
/// error.
pub fn place_sdk(
    archive: &Utf8Path,
    target_dir: &Utf8Path,
    extractor: &dyn SdkExtractor,
    stderr: &mut dyn Write,
) -> Result<()> {
    remove_existing_dir(target_dir, stderr)?;
    extractor
        .extract(archive, target_dir)
        .map_err(|source| FinalizeError::Extraction {
            archive: archive.to_owned(),
            source,
        })?;

    let build_file = target_dir.join(BUILD_FILE);
    if !build_file.is_file() {
        return Err(FinalizeError::MissingBuildFile { path: build_file });
    }
    std::fs::rename(&build_file, target_dir.join(DISABLED_BUILD_FILE))?;

    write_stderr_line(stderr, format!("Created {target_dir}"));
    Ok(())
}

#[cfg(test)]
#[path = "placement_tests.rs"]
mod tests;
