//! Projection of API files into the compatibility-tracking tree.
//!
//! Each extracted SDK carries `sdk_library/<api_type>/<name>.txt` API
//! signatures and `sdk_library/<api_type>/<name>.jar` stubs. These are copied
//! into `prebuilts/sdk/extensions/<N>/<api_type>/api/` and
//! `prebuilts/sdk/extensions/<N>/<api_type>/` respectively, under the names
//! `prebuilts/sdk` has always used for them.

use crate::error::{FinalizeError, Result};
use crate::touched::TouchedPaths;
use camino::{Utf8Path, Utf8PathBuf};

/// Patterns, relative to an extracted SDK, of the files to project.
const SOURCE_PATTERNS: [&str; 2] = ["sdk_library/*/*.txt", "sdk_library/*/*.jar"];

/// Conscrypt ships legacy API tracking files that extensions do not consider.
const IGNORED_STEM_PREFIXES: [&str; 2] = [
    "conscrypt.module.intra.core.api",
    "conscrypt.module.platform.api",
];

/// Stem rewrites, applied in order to every projected file.
///
/// ART and Conscrypt name their API files `*.module.public.api`, while
/// `prebuilts/sdk` uses the bare module name. Stub jars from official builds
/// end in `-stubs`, which `prebuilts/sdk` omits.
const STEM_REWRITES: [(&str, &str); 3] = [
    ("art.module.public.api", "art"),
    ("conscrypt.module.public.api", "conscrypt"),
    ("-stubs", ""),
];

/// How a projected file is laid out in the compatibility tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompatKind {
    /// API signature text file, stored under `<api_type>/api/`.
    ApiText,
    /// Stub jar, stored directly under `<api_type>/`.
    StubJar,
}

impl CompatKind {
    /// Classifies a file by extension.
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        match path.extension() {
            Some("txt") => Some(Self::ApiText),
            Some("jar") => Some(Self::StubJar),
            _ => None,
        }
    }
}

/// Returns `true` for files that are never copied.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use finalize_sdk::compat::is_ignored;
///
/// assert!(is_ignored(Utf8Path::new("sdk_library/public/conscrypt.module.platform.api.txt")));
/// assert!(!is_ignored(Utf8Path::new("sdk_library/public/conscrypt.module.public.api.txt")));
/// ```
#[must_use]
pub fn is_ignored(path: &Utf8Path) -> bool {
    path.file_stem().is_some_and(|stem| {
        IGNORED_STEM_PREFIXES
            .iter()
            .any(|prefix| stem.starts_with(prefix))
    })
}

/// Returns the file name `prebuilts/sdk` expects for `file_name`.
///
/// # Examples
///
/// ```
/// use finalize_sdk::compat::compat_file_name;
///
/// assert_eq!(compat_file_name("art.module.public.api-stubs.jar"), "art.jar");
/// assert_eq!(compat_file_name("conscrypt.module.public.api.txt"), "conscrypt.txt");
/// assert_eq!(compat_file_name("framework-wifi.txt"), "framework-wifi.txt");
/// ```
#[must_use]
pub fn compat_file_name(file_name: &str) -> String {
    let path = Utf8Path::new(file_name);
    let (stem, extension) = match (path.file_stem(), path.extension()) {
        (Some(stem), Some(extension)) => (stem, Some(extension)),
        _ => (file_name, None),
    };

    let new_stem = STEM_REWRITES
        .iter()
        .fold(stem.to_owned(), |acc, (from, to)| acc.replace(from, to));

    match extension {
        Some(extension) => format!("{new_stem}.{extension}"),
        None => new_stem,
    }
}

/// Computes where `source` is copied, relative to the API snapshot
/// directory. Returns `None` for files outside `<api_type>/<file>.{txt,jar}`.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use finalize_sdk::compat::compat_destination;
///
/// let dest = compat_destination(Utf8Path::new("foo/sdk_library/public/bar.txt"));
/// assert_eq!(dest.as_deref().map(|p| p.as_str()), Some("public/api/bar.txt"));
///
/// let dest = compat_destination(Utf8Path::new("foo/sdk_library/system/bar-stubs.jar"));
/// assert_eq!(dest.as_deref().map(|p| p.as_str()), Some("system/bar.jar"));
/// ```
#[must_use]
pub fn compat_destination(source: &Utf8Path) -> Option<Utf8PathBuf> {
    let kind = CompatKind::from_path(source)?;
    let file_name = source.file_name()?;
    let api_type = source.parent()?.file_name()?;

    let dir = match kind {
        CompatKind::ApiText => Utf8Path::new(api_type).join("api"),
        CompatKind::StubJar => Utf8PathBuf::from(api_type),
    };
    Some(dir.join(compat_file_name(file_name)))
}

/// Copies the API files of the SDK extracted at `sdk_dir` into the snapshot
/// directory `compat_dir`, which is `relative_dir` inside `compat_repo`.
///
/// Every destination directory is recorded in `touched`, relative to
/// `compat_repo`. Existing files of the same name are overwritten.
///
/// # Errors
///
/// Returns an I/O error if a directory cannot be created or a copy fails.
pub fn project_api_files(
    sdk_dir: &Utf8Path,
    compat_repo: &Utf8Path,
    relative_dir: &Utf8Path,
    touched: &mut TouchedPaths,
) -> Result<usize> {
    let compat_dir = compat_repo.join(relative_dir);
    let mut copied = 0;

    for source in matching_files(sdk_dir)? {
        if is_ignored(&source) {
            log::debug!("skipping legacy API file {source}");
            continue;
        }
        let Some(destination) = compat_destination(&source) else {
            continue;
        };
        let Some(dest_dir) = destination.parent() else {
            continue;
        };

        std::fs::create_dir_all(compat_dir.join(dest_dir))?;
        std::fs::copy(&source, compat_dir.join(&destination))?;
        log::trace!("copied {source} to {}", compat_dir.join(&destination));

        touched.record(compat_repo, &relative_dir.join(dest_dir));
        copied += 1;
    }

    Ok(copied)
}

/// Lists the files under `sdk_dir` matching [`SOURCE_PATTERNS`], sorted.
fn matching_files(sdk_dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let mut files = Vec::new();
    for pattern in SOURCE_PATTERNS {
        let full = format!("{}/{pattern}", glob::Pattern::escape(sdk_dir.as_str()));
        let walker = glob::glob(&full).map_err(|err| {
            FinalizeError::Io(std::io::Error::other(format!("bad pattern {full}: {err}")))
        })?;
        for entry in walker {
            let path = entry.map_err(|err| FinalizeError::Io(err.into_error()))?;
            let utf8 = Utf8PathBuf::try_from(path).map_err(|err| FinalizeError::NonUtf8Path {
                path: err.into_path_buf().display().to_string(),
            })?;
            if utf8.is_file() {
                files.push(utf8);
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
#[path = "compat_tests.rs"]
mod tests;
