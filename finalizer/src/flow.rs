//! End-to-end finalization flow.
//!
//! This module keeps mode selection (dry run, local, managed, committing)
//! separate from argument parsing in `main.rs`, so the whole run can be
//! driven from tests with a scripted executor.

use crate::artefact::extraction::SdkExtractor;
use crate::artefact::source::{ArtefactSource, FetchArtifactSource, LocalBuildSource};
use crate::cli::{ALL_MODULES, Cli};
use crate::commit::{
    CommitRequest, commit_all, commit_message, readme_entry, reproducible_command_line,
};
use crate::config::FinalizeConfig;
use crate::error::Result;
use crate::exec::CommandExecutor;
use crate::output::{LOCAL_MODE_NOTICE, write_stderr_line};
use crate::pipeline::{PipelineContext, finalize_prebuilts};
use crate::workspace::{Layout, ensure_source_tree};
use camino::Utf8Path;
use std::io::Write;

/// Everything a run needs besides its arguments.
pub struct RunEnvironment<'a> {
    /// Directory the tool was started from.
    pub cwd: &'a Utf8Path,
    /// Raw process arguments, recorded in the commit message.
    pub argv: &'a [String],
    /// Resolved tool configuration.
    pub config: &'a FinalizeConfig,
    /// Runs the artifact-fetch tool, `repo` and `git`.
    pub executor: &'a dyn CommandExecutor,
    /// Unpacks SDK archives.
    pub extractor: &'a dyn SdkExtractor,
}

/// Values derived from the arguments before anything is touched.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunPlan {
    /// Build target artifacts are fetched from.
    pub build_target: String,
    /// Branch started across touched repositories.
    pub branch: String,
    /// Module names requested from the artefact source.
    pub modules: Vec<String>,
    /// Commit message used when committing.
    pub commit_message: String,
}

impl RunPlan {
    /// Derives the plan for `cli`, recording `argv` as the command line.
    ///
    /// Local builds always provide every module, so local runs request the
    /// wildcard once regardless of `-m`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::FinalizeError::CommandLine`] if `argv` cannot
    /// be quoted.
    pub fn new(cli: &Cli, argv: &[String]) -> Result<Self> {
        let command_line = reproducible_command_line(argv)?;
        let modules = if cli.local_mode {
            vec![ALL_MODULES.to_owned()]
        } else {
            cli.module_names()
        };
        Ok(Self {
            build_target: cli.build_target(),
            branch: cli.branch_name(),
            modules,
            commit_message: commit_message(cli.finalize_sdk, &cli.bid, &command_line, cli.bug),
        })
    }
}

/// Runs one finalization.
///
/// # Errors
///
/// Returns the first failure of any stage. Earlier filesystem changes are
/// left in place.
pub fn run(cli: &Cli, env: &RunEnvironment<'_>, stderr: &mut dyn Write) -> Result<()> {
    if !cli.gantry_mode {
        ensure_source_tree(env.cwd)?;
    }

    let plan = RunPlan::new(cli, env.argv)?;
    let layout = Layout::new(env.cwd, cli.gantry_mode, env.config);

    if cli.dry_run {
        print_dry_run_info(cli, &plan, &layout, stderr);
        return Ok(());
    }

    let local;
    let remote;
    let source: &dyn ArtefactSource = if cli.local_mode {
        local = LocalBuildSource::new(env.cwd);
        &local
    } else {
        remote = FetchArtifactSource::new(
            &env.config.fetch_artifact,
            &cli.bid,
            &plan.build_target,
            env.executor,
        );
        &remote
    };

    let context = PipelineContext {
        version: cli.finalize_sdk,
        modules: &plan.modules,
        layout: &layout,
        source,
        extractor: env.extractor,
    };
    let touched = finalize_prebuilts(&context, stderr)?;

    if cli.local_mode {
        write_stderr_line(stderr, LOCAL_MODE_NOTICE);
        return Ok(());
    }
    if cli.gantry_mode {
        log::info!("managed run, leaving changes under {} uncommitted", layout.root());
        return Ok(());
    }

    let entry = readme_entry(cli.finalize_sdk, &cli.readme);
    let compat_repo = layout.compat_repo();
    let request = CommitRequest {
        branch: &plan.branch,
        message: &plan.commit_message,
        compat_repo: &compat_repo,
        compat_readme: layout.compat_readme(),
        readme_entry: &entry,
        amend: cli.amend_last_commit,
    };
    commit_all(&touched, &request, env.executor, stderr)
}

fn print_dry_run_info(cli: &Cli, plan: &RunPlan, layout: &Layout, stderr: &mut dyn Write) {
    write_stderr_line(stderr, "Dry run - no files will be modified");
    write_stderr_line(stderr, "");
    write_stderr_line(stderr, format!("Extension SDK:  {}", cli.finalize_sdk));
    write_stderr_line(stderr, format!("Build ID:       {}", cli.bid));
    write_stderr_line(stderr, format!("Build target:   {}", plan.build_target));
    write_stderr_line(stderr, format!("Modules:        {}", plan.modules.join(", ")));
    write_stderr_line(stderr, format!("Output root:    {}", layout.root()));
    write_stderr_line(stderr, format!("Compat repo:    {}", layout.compat_repo()));
    if cli.skips_commit() {
        write_stderr_line(stderr, "Commit:         skipped");
    } else {
        write_stderr_line(stderr, format!("Branch:         {}", plan.branch));
        write_stderr_line(stderr, format!("Amend:          {}", cli.amend_last_commit));
        write_stderr_line(stderr, "Commit message:");
        for line in plan.commit_message.lines() {
            write_stderr_line(stderr, format!("  {line}"));
        }
    }
}

#[cfg(test)]
#[path = "flow_tests.rs"]
mod tests;
