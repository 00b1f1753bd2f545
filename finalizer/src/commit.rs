//! Version-control commits for a finalization run.
//!
//! A `repo start` branch spans every touched repository. Each repository then
//! gets exactly its touched paths staged and one commit (or an amended HEAD)
//! with the templated message. The compatibility repository additionally
//! receives the changelog entry.

use crate::error::{FinalizeError, Result};
use crate::exec::{CommandExecutor, combined_output};
use crate::output::write_stderr_line;
use crate::touched::TouchedPaths;
use camino::Utf8Path;
use std::fs::OpenOptions;
use std::io::Write;
use std::process::Output;

/// Flags that only select a mode and do not change the imported prebuilts.
const MODE_ONLY_FLAGS: [&str; 5] = [
    "-a",
    "--amend_last_commit",
    "-l",
    "--local_mode",
    "--dry-run",
];

/// Footer key carried over when amending.
const CHANGE_ID_KEY: &str = "Change-Id:";

/// Inputs for the commit step.
#[derive(Clone, Copy, Debug)]
pub struct CommitRequest<'a> {
    /// Branch started across the touched repositories.
    pub branch: &'a str,
    /// Full commit message.
    pub message: &'a str,
    /// Compatibility-tracking repository.
    pub compat_repo: &'a Utf8Path,
    /// Changelog path, relative to `compat_repo`.
    pub compat_readme: &'a Utf8Path,
    /// Changelog line, without trailing newline.
    pub readme_entry: &'a str,
    /// Amend HEAD instead of creating a new commit.
    pub amend: bool,
}

/// Renders the commit message.
///
/// # Examples
///
/// ```
/// use finalize_sdk::commit::commit_message;
///
/// let message = commit_message(12, "T1234", "finalize-sdk -f 12 T1234", 42);
/// assert!(message.starts_with("Finalize artifacts for extension SDK 12\n"));
/// assert!(message.ends_with("Bug: 42\nTest: presubmit"));
/// ```
#[must_use]
pub fn commit_message(version: u32, build_id: &str, command_line: &str, bug: u64) -> String {
    format!(
        "Finalize artifacts for extension SDK {version}\n\
         \n\
         Import from build id {build_id}.\n\
         \n\
         Generated with:\n\
         $ {command_line}\n\
         \n\
         Bug: {bug}\n\
         Test: presubmit"
    )
}

/// Renders the changelog line for `version`.
#[must_use]
pub fn readme_entry(version: u32, text: &str) -> String {
    format!("- {version}: {text}")
}

/// Shell-quotes `argv` for the commit message, dropping mode-only flags.
///
/// # Errors
///
/// Returns [`FinalizeError::CommandLine`] if an argument cannot be quoted.
///
/// # Examples
///
/// ```
/// use finalize_sdk::commit::reproducible_command_line;
///
/// let argv = ["finalize-sdk", "-a", "-f", "5", "-r", "two words", "-l", "123"];
/// assert_eq!(
///     reproducible_command_line(&argv)?,
///     "finalize-sdk -f 5 -r 'two words' 123"
/// );
/// # Ok::<(), finalize_sdk::error::FinalizeError>(())
/// ```
pub fn reproducible_command_line<S: AsRef<str>>(argv: &[S]) -> Result<String> {
    let kept = argv
        .iter()
        .map(AsRef::as_ref)
        .filter(|arg| !MODE_ONLY_FLAGS.contains(arg));
    shlex::try_join(kept).map_err(|err| FinalizeError::CommandLine {
        reason: err.to_string(),
    })
}

/// Extracts the `Change-Id:` footer line from `git log` output.
///
/// # Examples
///
/// ```
/// use finalize_sdk::commit::find_change_id;
///
/// let log = "commit abc\n\n    Title\n\n    Change-Id: I0123456789abcdef\n";
/// assert_eq!(find_change_id(log), Some("Change-Id: I0123456789abcdef"));
/// ```
#[must_use]
pub fn find_change_id(log: &str) -> Option<&str> {
    log.lines().find_map(|line| {
        let start = line.find(CHANGE_ID_KEY)?;
        let footer = line.get(start..)?.trim_end();
        (footer.len() > CHANGE_ID_KEY.len()).then_some(footer)
    })
}

/// Creates the branch and commits every touched repository.
///
/// # Errors
///
/// Returns [`FinalizeError::VersionControl`] if `repo` or `git` fails,
/// [`FinalizeError::MissingChangeId`] when amending a commit without a
/// `Change-Id:` footer, or an I/O error if the changelog cannot be written.
pub fn commit_all(
    touched: &TouchedPaths,
    request: &CommitRequest<'_>,
    executor: &dyn CommandExecutor,
    stderr: &mut dyn Write,
) -> Result<()> {
    let mut start_args = vec!["start", request.branch];
    start_args.extend(touched.repos().map(Utf8Path::as_str));
    run_checked(executor, "repo", &start_args, "repo start")?;

    write_stderr_line(stderr, "Running git commit");
    for repo in touched.repos() {
        commit_repo(touched, repo, request, executor)?;
    }
    Ok(())
}

fn commit_repo(
    touched: &TouchedPaths,
    repo: &Utf8Path,
    request: &CommitRequest<'_>,
    executor: &dyn CommandExecutor,
) -> Result<()> {
    let git = |args: &[&str], operation: &'static str| {
        let mut full = vec!["-C", repo.as_str()];
        full.extend_from_slice(args);
        run_checked(executor, "git", &full, operation)
    };

    let mut add_args = vec!["add"];
    add_args.extend(touched.paths(repo).map(Utf8Path::as_str));
    git(&add_args, "git add")?;

    if repo == request.compat_repo {
        append_readme(&repo.join(request.compat_readme), request.readme_entry)?;
        git(&["add", request.compat_readme.as_str()], "git add")?;
    }

    if request.amend {
        let log = git(&["log", "-1"], "git log")?;
        let log_text = String::from_utf8_lossy(&log.stdout);
        let change_id = find_change_id(&log_text).ok_or_else(|| FinalizeError::MissingChangeId {
            repo: repo.to_owned(),
        })?;
        let message = format!("{}\n{change_id}", request.message);
        git(&["commit", "--amend", "-m", message.as_str()], "git commit --amend")?;
    } else {
        git(&["commit", "-m", request.message], "git commit")?;
    }
    Ok(())
}

fn append_readme(path: &Utf8Path, entry: &str) -> Result<()> {
    let mut readme = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(readme, "{entry}")?;
    Ok(())
}

fn run_checked(
    executor: &dyn CommandExecutor,
    cmd: &str,
    args: &[&str],
    operation: &'static str,
) -> Result<Output> {
    let output = executor.run(cmd, args)?;
    if !output.status.success() {
        return Err(FinalizeError::VersionControl {
            operation,
            message: combined_output(&output),
        });
    }
    Ok(output)
}

#[cfg(test)]
#[path = "commit_tests.rs"]
mod tests;
