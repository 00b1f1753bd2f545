//! BDD tests for the end-to-end finalization workflow.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use finalize_sdk::artefact::extraction::ZipExtractor;
use finalize_sdk::cli::Cli;
use finalize_sdk::config::{DEFAULT_FETCH_ARTIFACT, FinalizeConfig};
use finalize_sdk::error::Result as FinalizeResult;
use finalize_sdk::exec::CommandExecutor;
use finalize_sdk::flow::{RunEnvironment, run};
use finalize_sdk::test_utils::{failure_output, success_output, write_zip};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use std::process::Output;

const MANIFEST: &str = r#"{
  "foo": { "sdk_name": "foo-sdk", "module_sdk_project": "prebuilts/module_foo" }
}"#;

const MODULES_INFO_PATTERN: &str = "mainline-modules-info.json";

fn sdk_entries() -> [(&'static str, &'static [u8]); 2] {
    [
        ("Android.bp", b"sdk_snapshot {}".as_slice()),
        ("sdk_library/public/foo.txt", b"// Signature format: 2.0".as_slice()),
    ]
}

/// Plays the artifact-fetch tool, `repo` and `git`, recording every call.
///
/// Fetches write the published artefacts into the destination directory
/// (the tool's last argument). Every other command succeeds.
#[derive(Default)]
struct RecordingExecutor {
    published: Vec<String>,
    fail_fetch: bool,
    calls: RefCell<Vec<Vec<String>>>,
}

impl CommandExecutor for RecordingExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> FinalizeResult<Output> {
        let mut call = vec![cmd.to_owned()];
        call.extend(args.iter().map(|arg| (*arg).to_owned()));
        self.calls.borrow_mut().push(call);

        if cmd != DEFAULT_FETCH_ARTIFACT {
            return Ok(success_output());
        }
        if self.fail_fetch {
            return Ok(failure_output("artifact not found"));
        }

        let dest = Utf8Path::new(args.last().copied().unwrap_or_default());
        if args.contains(&MODULES_INFO_PATTERN) {
            std::fs::write(dest.join(MODULES_INFO_PATTERN), MANIFEST)?;
        } else {
            for name in &self.published {
                write_zip(&dest.join(name), &sdk_entries());
            }
        }
        Ok(success_output())
    }
}

struct FinalizeWorld {
    _temp_dir: tempfile::TempDir,
    root: Utf8PathBuf,
    managed_root: Utf8PathBuf,
    executor: RecordingExecutor,
    stderr: String,
    error: Option<String>,
}

impl FinalizeWorld {
    fn commands(&self, cmd: &str) -> Vec<Vec<String>> {
        self.executor
            .calls
            .borrow()
            .iter()
            .filter(|call| call.first().is_some_and(|name| name == cmd))
            .cloned()
            .collect()
    }
}

#[fixture]
fn world() -> FinalizeWorld {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).expect("UTF-8 path");
    FinalizeWorld {
        managed_root: root.join("managed"),
        root,
        _temp_dir: temp_dir,
        executor: RecordingExecutor::default(),
        stderr: String::new(),
        error: None,
    }
}

#[given("an Android source tree")]
fn given_source_tree(world: &mut FinalizeWorld) {
    std::fs::create_dir_all(world.root.join("build/soong")).expect("create source tree marker");
}

#[given("a directory that is not a source tree")]
fn given_plain_directory(world: &mut FinalizeWorld) {
    assert!(!world.root.join("build/soong").exists());
}

#[given("the build publishes \"{archive}\"")]
fn given_published_archive(world: &mut FinalizeWorld, archive: String) {
    world.executor.published.push(archive);
}

#[given("the local build output contains \"{archive}\"")]
fn given_local_build_output(world: &mut FinalizeWorld, archive: String) {
    let dist = world.root.join("out/dist");
    let sdk_dir = dist.join("mainline-sdks/for-next-build/current/foo/sdk");
    std::fs::create_dir_all(&sdk_dir).expect("create local sdk dir");
    std::fs::write(dist.join(MODULES_INFO_PATTERN), MANIFEST).expect("write local manifest");
    write_zip(&sdk_dir.join(archive), &sdk_entries());
}

#[given("the artifact-fetch tool fails")]
fn given_fetch_fails(world: &mut FinalizeWorld) {
    world.executor.fail_fetch = true;
}

#[when("the finalizer runs with \"{args}\"")]
fn when_finalizer_runs(world: &mut FinalizeWorld, args: String) {
    let argv: Vec<String> = std::iter::once("finalize-sdk")
        .chain(args.split_whitespace())
        .map(str::to_owned)
        .collect();
    let cli = Cli::parse_from(&argv);
    let config = FinalizeConfig {
        managed_root: world.managed_root.clone(),
        ..FinalizeConfig::default()
    };
    let env = RunEnvironment {
        cwd: &world.root,
        argv: &argv,
        config: &config,
        executor: &world.executor,
        extractor: &ZipExtractor,
    };

    let mut stderr = Vec::new();
    world.error = run(&cli, &env, &mut stderr).err().map(|err| err.to_string());
    world.stderr = String::from_utf8(stderr).expect("stderr was not UTF-8");
}

#[then("the run succeeds")]
fn then_run_succeeds(world: &mut FinalizeWorld) {
    assert_eq!(world.error, None, "output:\n{}", world.stderr);
}

#[then("the run fails with \"{message}\"")]
fn then_run_fails(world: &mut FinalizeWorld, message: String) {
    let error = world.error.as_deref().expect("run should fail");
    assert_eq!(error.replace('"', ""), message);
}

#[then("the file \"{path}\" exists")]
fn then_file_exists(world: &mut FinalizeWorld, path: String) {
    let full = world.root.join(&path);
    assert!(full.is_file(), "expected {full} to exist");
}

#[then("the file \"{path}\" does not exist")]
fn then_file_absent(world: &mut FinalizeWorld, path: String) {
    let full = world.root.join(&path);
    assert!(!full.exists(), "expected {full} to be absent");
}

#[then("the managed file \"{path}\" exists")]
fn then_managed_file_exists(world: &mut FinalizeWorld, path: String) {
    let full = world.managed_root.join(&path);
    assert!(full.is_file(), "expected {full} to exist");
    assert!(!world.root.join("prebuilts").exists());
}

#[then("the artifacts were fetched from \"{target}\"")]
fn then_fetched_from(world: &mut FinalizeWorld, target: String) {
    let fetches = world.commands(DEFAULT_FETCH_ARTIFACT);
    assert_eq!(fetches.len(), 2);
    for fetch in fetches {
        let target_arg = fetch
            .iter()
            .position(|arg| arg == "--target")
            .and_then(|index| fetch.get(index + 1));
        assert_eq!(target_arg, Some(&target));
    }
}

#[then("the branch \"{branch}\" is started in {count} repositories")]
fn then_branch_started(world: &mut FinalizeWorld, branch: String, count: usize) {
    let starts = world.commands("repo");
    assert_eq!(starts.len(), 1);
    let start = starts.first().expect("repo start");
    assert_eq!(start.get(1).map(String::as_str), Some("start"));
    assert_eq!(start.get(2), Some(&branch));
    assert_eq!(start.len(), 3 + count);
}

#[then("{count} commits are made")]
fn then_commits_made(world: &mut FinalizeWorld, count: usize) {
    let commits = world
        .commands("git")
        .into_iter()
        .filter(|call| call.get(3).is_some_and(|sub| sub == "commit"))
        .count();
    assert_eq!(commits, count);
}

#[then("the changelog ends with \"{entry}\"")]
fn then_changelog_entry(world: &mut FinalizeWorld, entry: String) {
    let readme = std::fs::read_to_string(world.root.join("prebuilts/sdk/extensions/README.md"))
        .expect("read changelog");
    assert!(readme.ends_with(&format!("{entry}\n")), "changelog: {readme}");
}

#[then("no external command is run")]
fn then_no_commands(world: &mut FinalizeWorld) {
    assert!(world.executor.calls.borrow().is_empty());
}

#[then("no version-control command is run")]
fn then_no_vcs_commands(world: &mut FinalizeWorld) {
    assert!(world.commands("repo").is_empty());
    assert!(world.commands("git").is_empty());
}

#[then("the output mentions \"{text}\"")]
fn then_output_mentions(world: &mut FinalizeWorld, text: String) {
    assert!(world.stderr.contains(&text), "output:\n{}", world.stderr);
}

#[scenario(
    path = "tests/features/finalize.feature",
    name = "Finalizing a train build commits the imported prebuilts"
)]
fn scenario_train_build(world: FinalizeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/finalize.feature",
    name = "Host and test exports land in separate directories"
)]
fn scenario_export_directories(world: FinalizeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/finalize.feature",
    name = "Local mode never touches version control"
)]
fn scenario_local_mode(world: FinalizeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/finalize.feature",
    name = "Managed mode writes under the managed root"
)]
fn scenario_managed_mode(world: FinalizeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/finalize.feature",
    name = "An archive without a matching module aborts the run"
)]
fn scenario_unmapped_archive(world: FinalizeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/finalize.feature",
    name = "A failed fetch aborts the run"
)]
fn scenario_failed_fetch(world: FinalizeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/finalize.feature",
    name = "Running outside a source tree is rejected"
)]
fn scenario_outside_source_tree(world: FinalizeWorld) {
    let _ = world;
}
