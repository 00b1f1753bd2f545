//! CLI argument definitions for the SDK finalizer.
//!
//! Flag names keep the underscore spelling of the tool's historical interface
//! so that command lines recorded in earlier commit messages still parse.

use camino::Utf8PathBuf;
use clap::Parser;

/// Build target used when fetching from a train build (`TXXXXXXXX`).
pub const BUILD_TARGET_TRAIN: &str = "train_build";

/// Build target used when fetching from a continuous build (`XXXXXXXX`).
pub const BUILD_TARGET_CONTINUOUS: &str = "mainline_modules_sdks-userdebug";

/// Build IDs starting with this marker come from a train build.
const TRAIN_BUILD_MARKER: char = 'T';

/// Wildcard selecting every module's SDK artifacts.
pub const ALL_MODULES: &str = "*";

/// Finalize an extension SDK with prebuilts.
#[derive(Parser, Debug, Clone)]
#[command(name = "finalize-sdk")]
#[command(version, about)]
#[command(long_about = concat!(
    "Finalize an extension SDK with prebuilts.\n\n",
    "Fetches the mainline module SDK zips for a build, extracts them into the ",
    "module prebuilt repositories, copies the API files into prebuilts/sdk and ",
    "commits the result on a `finalize-<N>` branch.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Finalize SDK 12 from a train build:\n",
    "    $ finalize-sdk -f 12 -b 123456 -r 'T-modules' T1234567\n\n",
    "  Refresh only two modules and amend the previous commits:\n",
    "    $ finalize-sdk -f 12 -b 123456 -r 'T-modules' -m art -m conscrypt -a T1234567\n\n",
    "  Try out locally built SDKs without committing:\n",
    "    $ finalize-sdk -f 12 -b 123456 -r 'local' -l 0\n",
))]
pub struct Cli {
    /// The numbered SDK to finalize.
    #[arg(short = 'f', long = "finalize_sdk", value_name = "N")]
    pub finalize_sdk: u32,

    /// The release config to use to finalize.
    #[arg(short = 'c', long = "release_config", value_name = "NAME")]
    pub release_config: Option<String>,

    /// The bug number to add to the commit message.
    #[arg(short = 'b', long = "bug", value_name = "N")]
    pub bug: u64,

    /// Version history entry to add to prebuilts/sdk/extensions/README.md.
    #[arg(short = 'r', long = "readme", value_name = "TEXT")]
    pub readme: String,

    /// Amend current HEAD commits instead of making new commits.
    #[arg(short = 'a', long = "amend_last_commit")]
    pub amend_last_commit: bool,

    /// Modules to include. Can be provided multiple times, or not at all for
    /// all modules.
    #[arg(short = 'm', long = "modules", value_name = "NAME")]
    pub modules: Vec<String>,

    /// Local mode: use locally built artifacts and don't upload the result.
    #[arg(short = 'l', long = "local_mode")]
    pub local_mode: bool,

    /// Managed execution: write under the managed root and skip commits.
    #[arg(short = 'g', long = "gantry_mode")]
    pub gantry_mode: bool,

    /// Show the resolved plan and exit without touching anything.
    #[arg(long)]
    pub dry_run: bool,

    /// TOML file overriding tool locations.
    #[arg(long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Build server build ID.
    #[arg(value_name = "BID")]
    pub bid: String,
}

impl Cli {
    /// Returns the build target the artifacts are fetched from.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use finalize_sdk::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["finalize-sdk", "-f", "5", "-b", "1", "-r", "x", "T100"]);
    /// assert_eq!(cli.build_target(), "train_build");
    /// ```
    #[must_use]
    pub fn build_target(&self) -> String {
        build_target(&self.bid, self.release_config.as_deref())
    }

    /// Returns the branch created across every touched repository.
    #[must_use]
    pub fn branch_name(&self) -> String {
        format!("finalize-{}", self.finalize_sdk)
    }

    /// Returns the requested module names, or the all-modules wildcard.
    #[must_use]
    pub fn module_names(&self) -> Vec<String> {
        if self.modules.is_empty() {
            vec![ALL_MODULES.to_owned()]
        } else {
            self.modules.clone()
        }
    }

    /// Returns `true` when the run must stop before any version-control step.
    #[must_use]
    pub const fn skips_commit(&self) -> bool {
        self.local_mode || self.gantry_mode
    }
}

/// Selects the build target from the first character of `build_id`.
///
/// Train builds use a fixed target; continuous builds use the userdebug SDK
/// target, parameterised by `release_config` when one is supplied.
#[must_use]
pub fn build_target(build_id: &str, release_config: Option<&str>) -> String {
    if build_id.starts_with(TRAIN_BUILD_MARKER) {
        return BUILD_TARGET_TRAIN.to_owned();
    }
    match release_config {
        Some(config) => format!("mainline_modules_sdks-{config}-userdebug"),
        None => BUILD_TARGET_CONTINUOUS.to_owned(),
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
