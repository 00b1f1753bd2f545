//! Progress output for the finalizer CLI.
//!
//! Progress lines go to an injected writer (stderr in the binary) so tests
//! can capture them. Writes are best-effort.

use std::io::Write;

/// Writes `message` followed by a newline, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Message printed when local mode stops before committing.
pub const LOCAL_MODE_NOTICE: &str = "Updated prebuilts using locally built artifacts. Don't submit or use for anything besides local testing.";
