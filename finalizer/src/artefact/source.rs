//! Artifact retrieval.
//!
//! Artifacts come either from a local `out/dist` build or from the build
//! server through the artifact-fetch tool. Both strategies implement
//! [`ArtefactSource`] and leave the requested files in a caller-supplied
//! directory, so the rest of the pipeline never knows which one ran.

use crate::error::{FinalizeError, Result};
use crate::exec::{CommandExecutor, combined_output};
use crate::output::write_stderr_line;
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;

/// File name of the modules-info manifest.
pub const MODULES_INFO: &str = "mainline-modules-info.json";

/// Local build location of the modules-info manifest.
pub const LOCAL_MODULES_INFO: &str = "out/dist/mainline-modules-info.json";

/// What to retrieve.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ArtefactRequest {
    /// The modules-info manifest.
    ModulesInfo,
    /// SDK zips of one module, or of every module for [`crate::cli::ALL_MODULES`].
    Sdks {
        /// Module name or `*`.
        module: String,
    },
}

impl ArtefactRequest {
    /// Returns the build-server path pattern for this request.
    ///
    /// # Examples
    ///
    /// ```
    /// use finalize_sdk::artefact::source::ArtefactRequest;
    ///
    /// let request = ArtefactRequest::Sdks { module: "art".to_owned() };
    /// assert_eq!(
    ///     request.remote_pattern(),
    ///     "mainline-sdks/for-next-build/current/art/sdk/*.zip"
    /// );
    /// ```
    #[must_use]
    pub fn remote_pattern(&self) -> String {
        match self {
            Self::ModulesInfo => MODULES_INFO.to_owned(),
            Self::Sdks { module } => sdk_pattern(module),
        }
    }

    /// Returns the pattern matched against a local build tree.
    ///
    /// Local builds always provide every module, so the module filter is
    /// not applied.
    #[must_use]
    pub fn local_pattern(&self) -> String {
        match self {
            Self::ModulesInfo => LOCAL_MODULES_INFO.to_owned(),
            Self::Sdks { .. } => format!("out/dist/{}", sdk_pattern("*")),
        }
    }
}

fn sdk_pattern(module: &str) -> String {
    format!("mainline-sdks/for-next-build/current/{module}/sdk/*.zip")
}

/// A place artifacts can be retrieved from.
pub trait ArtefactSource {
    /// Places the files matching `request` into `dest_dir`.
    ///
    /// Progress lines are written to `stderr`.
    ///
    /// # Errors
    ///
    /// Returns [`FinalizeError::RetrievalFailed`] when the artifacts cannot be
    /// obtained, or an I/O error when copying fails.
    fn fetch(
        &self,
        request: &ArtefactRequest,
        dest_dir: &Utf8Path,
        stderr: &mut dyn Write,
    ) -> Result<()>;
}

/// Copies artifacts out of a local build's `out/dist` directory.
#[derive(Clone, Debug)]
pub struct LocalBuildSource {
    tree_root: Utf8PathBuf,
}

impl LocalBuildSource {
    /// Creates a source reading from the build output under `tree_root`.
    #[must_use]
    pub fn new(tree_root: &Utf8Path) -> Self {
        Self {
            tree_root: tree_root.to_owned(),
        }
    }
}

impl ArtefactSource for LocalBuildSource {
    fn fetch(
        &self,
        request: &ArtefactRequest,
        dest_dir: &Utf8Path,
        stderr: &mut dyn Write,
    ) -> Result<()> {
        let pattern = self.tree_root.join(request.local_pattern());
        write_stderr_line(stderr, format!("Copying {pattern} to {dest_dir} ..."));

        let escaped = format!(
            "{}/{}",
            glob::Pattern::escape(self.tree_root.as_str()),
            request.local_pattern()
        );
        let matches = glob::glob(&escaped).map_err(|err| {
            FinalizeError::Io(std::io::Error::other(format!("bad pattern {pattern}: {err}")))
        })?;
        for entry in matches {
            let path = entry.map_err(|err| FinalizeError::Io(err.into_error()))?;
            let Some(name) = path.file_name() else {
                continue;
            };
            std::fs::copy(&path, dest_dir.as_std_path().join(name))?;
        }

        if *request == ArtefactRequest::ModulesInfo && !dest_dir.join(MODULES_INFO).is_file() {
            return Err(FinalizeError::RetrievalFailed {
                artefact: pattern.into_string(),
                build_id: "local".to_owned(),
                target: "local build".to_owned(),
            });
        }
        Ok(())
    }
}

/// Fetches artifacts from the build server with the artifact-fetch tool.
pub struct FetchArtifactSource<'a> {
    tool: Utf8PathBuf,
    build_id: String,
    target: String,
    executor: &'a dyn CommandExecutor,
}

impl<'a> FetchArtifactSource<'a> {
    /// Creates a source fetching from `target` at `build_id` with `tool`.
    #[must_use]
    pub fn new(
        tool: &Utf8Path,
        build_id: &str,
        target: &str,
        executor: &'a dyn CommandExecutor,
    ) -> Self {
        Self {
            tool: tool.to_owned(),
            build_id: build_id.to_owned(),
            target: target.to_owned(),
            executor,
        }
    }

    fn failure(&self, artefact: String) -> FinalizeError {
        FinalizeError::RetrievalFailed {
            artefact,
            build_id: self.build_id.clone(),
            target: self.target.clone(),
        }
    }
}

impl ArtefactSource for FetchArtifactSource<'_> {
    fn fetch(
        &self,
        request: &ArtefactRequest,
        dest_dir: &Utf8Path,
        stderr: &mut dyn Write,
    ) -> Result<()> {
        let pattern = request.remote_pattern();
        write_stderr_line(
            stderr,
            format!("Fetching {pattern} from {} ...", self.target),
        );

        let args = [
            "--bid",
            self.build_id.as_str(),
            "--target",
            self.target.as_str(),
            pattern.as_str(),
            dest_dir.as_str(),
        ];
        write_stderr_line(
            stderr,
            format!("Running: {} {}", self.tool, args.join(" ")),
        );

        let output = match self.executor.run(self.tool.as_str(), &args) {
            Ok(output) => output,
            Err(err) => {
                log::debug!("{} could not be started: {err}", self.tool);
                return Err(self.failure(pattern));
            }
        };
        log::debug!("{} output:\n{}", self.tool, combined_output(&output));
        if !output.status.success() {
            return Err(self.failure(pattern));
        }
        Ok(())
    }
}
