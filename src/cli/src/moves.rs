//! The `generate-moves` subcommand: read before/after fixture pairs and
//! write SPT move-class test files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{info, warn};

use sptgen::spt;
use sptgen::suite::{pair_stem, TestSuite};

use crate::args::GenerateMovesArgs;
use crate::discover::sorted_entries;
use crate::file_name;

pub(crate) fn run(args: &GenerateMovesArgs) -> Result<()> {
    let mut suites = Vec::new();
    let mut failed = 0usize;
    for input in &args.inputs {
        info!("Finding refactoring test suites in: {}", input.display());
        find_pairs(input, input, &mut suites, &mut failed)?;
    }
    info!("Found {} refactoring test suites.", suites.len());

    info!("Creating output directory: {}", args.output.display());
    fs::create_dir_all(&args.output)?;

    info!("Generating SPT test files in: {}", args.output.display());
    let mut count = 0;
    for suite in &suites {
        let written = spt::writer::write_to_file(
            &args.module_prefix,
            None,
            suite,
            &args.output,
            args.force,
            &[],
        )?;
        if written.is_some() {
            count += 1;
        }
        info!("  {}", suite.name);
    }
    info!(
        "Generated {count} SPT test files for {} tests.",
        suites.len()
    );
    if failed > 0 {
        warn!("Failed to read {failed} fixture pairs.");
    }

    info!("Done!");
    Ok(())
}

/// Find all before/after pairs under `directory`, naming them relative to
/// `root`.
fn find_pairs(
    directory: &Path,
    root: &Path,
    suites: &mut Vec<TestSuite>,
    failed: &mut usize,
) -> Result<()> {
    // Group the entries by their pair stem (directories keep their own
    // name).
    let mut groups: Vec<(String, Vec<PathBuf>)> = Vec::new();
    for entry in sorted_entries(directory)? {
        let stem = pair_stem(&file_name(&entry)).to_string();
        match groups.iter_mut().find(|(name, _)| *name == stem) {
            Some((_, group)) => group.push(entry),
            None => groups.push((stem, vec![entry])),
        }
    }

    for (name, group) in groups {
        if group.len() == 1 && group[0].is_dir() {
            find_pairs(&group[0], root, suites, failed)?;
        } else if group.len() == 2 {
            let Some(after) = group
                .iter()
                .find(|path| file_name(path).ends_with("_after.java"))
            else {
                warn!("Skipped, no 'after' file for test suite '{name}'");
                continue;
            };
            let before = group
                .iter()
                .find(|path| *path != after)
                .expect("the group holds two entries");
            match sptgen::read_refactoring_suite_from_files(before, after, root) {
                Ok(Some(suite)) => suites.push(suite),
                Ok(None) => {
                    info!("Skipped, no move-class annotation: {}", before.display());
                }
                Err(err) => {
                    *failed += 1;
                    warn!("Skipped {}: {err}", before.display());
                }
            }
        } else {
            warn!(
                "Skipped, too many files for test suite '{name}': {} entries",
                group.len()
            );
        }
    }

    Ok(())
}
