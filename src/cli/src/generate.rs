//! The `generate` subcommand: read marked-up fixture files and write SPT
//! test files for each requested kind.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use ignore::WalkBuilder;
use log::{info, warn};

use sptgen::spt;
use sptgen::TestKind;

use crate::args::GenerateArgs;

pub(crate) fn run(args: &GenerateArgs) -> Result<()> {
    // Gather all test suites. A fixture that fails to read is reported and
    // skipped; the batch continues.
    let mut suites = Vec::new();
    let mut failed = 0usize;
    for input in &args.inputs {
        info!("Finding test suites in: {}", input.display());
        for file in fixture_files(input)? {
            match sptgen::read_suite_from_file(&file, input) {
                Ok(suite) => suites.push(suite),
                Err(err) => {
                    failed += 1;
                    warn!("Skipped {}: {err}", file.display());
                }
            }
        }
    }
    info!("Found {} test suites.", suites.len());

    let total = suites.len();
    let suites = if args.all {
        suites
    } else {
        suites
            .into_iter()
            .filter(|suite| suite.has_ref_ret_cases())
            .collect::<Vec<_>>()
    };
    if suites.len() != total {
        warn!("Filtered out {} empty test suites.", total - suites.len());
    }

    info!("Creating output directory: {}", args.output.display());
    fs::create_dir_all(&args.output)?;

    // Write each suite out as one SPT file per requested kind.
    info!("Generating SPT test files in: {}", args.output.display());
    let mut count = 0;
    for suite in &suites {
        for kind in &args.kinds {
            let written = spt::writer::write_to_file(
                &args.module_prefix,
                Some(kind.submodule()),
                suite,
                &args.output,
                args.force,
                &[TestKind::from(*kind)],
            )?;
            if written.is_some() {
                count += 1;
            }
        }
        info!("  {}", suite.name);
    }
    info!(
        "Generated {count} SPT test files for {} tests.",
        suites.len()
    );
    if failed > 0 {
        warn!("Failed to read {failed} fixture files.");
    }

    info!("Done!");
    Ok(())
}

/// All files under `root`, in path order.
fn fixture_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkBuilder::new(root).build() {
        let entry = entry?;
        if entry.file_type().is_some_and(|file_type| file_type.is_file()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
