//! CLI logic for the sptgen test generator.
//!
//! The engine in the `sptgen` crate only consumes `(text, name, directory)`
//! triples and produces rendered text; everything filesystem-shaped lives
//! here: walking input trees, grouping fixture pairs, deciding output
//! locations, and reporting progress through the `log` facade.

mod args;
mod discover;
mod generate;
mod moves;

pub use args::Args;

use std::borrow::Cow;
use std::path::Path;

use args::Command;

/// Run the sptgen CLI application.
///
/// # Errors
///
/// Returns an error for unreadable input trees or unwritable output
/// locations. Failures limited to a single fixture are logged and counted
/// instead, so one broken fixture does not block a batch run.
pub fn run(args: &Args) -> anyhow::Result<()> {
    match &args.command {
        Command::Discover(args) => discover::run(args),
        Command::Generate(args) => generate::run(args),
        Command::GenerateMoves(args) => moves::run(args),
    }
}

/// The file name of `path` as a string; empty when the path has none.
pub(crate) fn file_name(path: &Path) -> Cow<'_, str> {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or(Cow::Borrowed(""))
}
