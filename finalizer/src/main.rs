//! Extension SDK finalizer CLI entrypoint.
//!
//! This binary fetches the Mainline module SDKs of a build, installs them as
//! prebuilts and commits them on a `finalize-<N>` branch.

use clap::Parser;
use finalize_sdk::artefact::extraction::ZipExtractor;
use finalize_sdk::cli::Cli;
use finalize_sdk::config::FinalizeConfig;
use finalize_sdk::error::Result;
use finalize_sdk::exec::SystemCommandExecutor;
use finalize_sdk::flow::{RunEnvironment, run};
use finalize_sdk::output::write_stderr_line;
use finalize_sdk::workspace::current_dir_utf8;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let argv: Vec<String> = std::env::args().collect();
    let mut stderr = std::io::stderr();
    let run_result = run_cli(&cli, &argv, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run_cli(cli: &Cli, argv: &[String], stderr: &mut dyn Write) -> Result<()> {
    let config = FinalizeConfig::load(cli.config.as_deref())?;
    let cwd = current_dir_utf8()?;
    let env = RunEnvironment {
        cwd: &cwd,
        argv,
        config: &config,
        executor: &SystemCommandExecutor,
        extractor: &ZipExtractor,
    };
    run(cli, &env, stderr)
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}
