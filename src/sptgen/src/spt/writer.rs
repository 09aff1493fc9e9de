//! Utilities for writing generated SPT test-suite files.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::suite::{TestKind, TestSuite};

/// Write the test suite as an SPT file in the given directory.
///
/// The file lands at `<output_dir>[/<submodule>]/<directory>/<name>.spt`,
/// creating directories as needed. When the file already exists and `force`
/// is not set, nothing is written and `None` is returned; otherwise the
/// written path is returned.
pub fn write_to_file(
    module_prefix: &str,
    submodule: Option<&str>,
    suite: &TestSuite,
    output_dir: &Path,
    force: bool,
    kinds: &[TestKind],
) -> std::io::Result<Option<PathBuf>> {
    let test_dir = match submodule {
        Some(submodule) => output_dir.join(submodule),
        None => output_dir.to_path_buf(),
    }
    .join(&suite.directory);
    fs::create_dir_all(&test_dir)?;

    let destination = test_dir.join(format!("{}.spt", suite.name));
    if !force && destination.exists() {
        return Ok(None);
    }

    let mut buffer = Vec::new();
    super::write_suite(&mut buffer, module_prefix, submodule, suite, kinds)?;

    // Open without truncating so the exclusive lock is held before the
    // file contents are touched.
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .open(&destination)?;
    file.lock_exclusive()?;
    file.set_len(0)?;
    file.write_all(&buffer)?;

    Ok(Some(destination))
}
