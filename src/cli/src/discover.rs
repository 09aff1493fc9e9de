//! The `discover` subcommand: find Java test projects and assemble them
//! into fixture files.
//!
//! Two input layouts are recognized. A directory whose entries include an
//! `in` or `out` directory holds one project per subdirectory (the
//! subdirectory name becomes the project qualifier). A directory with
//! `*_in.java`/`*_out.java` files holds one project per file, named
//! `<Unit>_<test>_<qualifier>.java`. Anything else is recursed into.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use sptgen::project::{self, JavaPackage, JavaProject, JavaUnit};

use crate::args::DiscoverArgs;
use crate::file_name;

/// Matches a single-file project name into (unit, test, qualifier).
static PROJECT_FILENAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^_]+)_([^_]+)_([^_]+)\.java$").expect("valid file name regex"));

pub(crate) fn run(args: &DiscoverArgs) -> Result<()> {
    let mut projects = Vec::new();
    for input in &args.inputs {
        info!("Finding test Java projects in: {}", input.display());
        find_projects(input, input, &mut projects)
            .with_context(|| format!("searching {}", input.display()))?;
    }
    info!("Found {} test Java projects.", projects.len());

    info!("Creating output directory: {}", args.output.display());
    fs::create_dir_all(&args.output)?;

    info!("Generating test suite files in: {}", args.output.display());
    let mut skipped = Vec::new();
    let mut written = 0;
    for project in &projects {
        match project::write_to_file(project, &args.output, args.force)? {
            Some(_) => {
                written += 1;
                info!("  {}/{}", project.directory, project.file_stem());
            }
            None => skipped.push(project),
        }
    }
    if !skipped.is_empty() {
        warn!(
            "Skipped generating {} test suite files, because they already exist:",
            skipped.len()
        );
        for project in &skipped {
            warn!("  {}/{}", project.directory, project.file_stem());
        }
    }
    info!("Generated {} test suite files.", written);

    info!("Done!");
    Ok(())
}

/// Find all Java projects under `directory`, naming them relative to
/// `root`.
pub(crate) fn find_projects(
    directory: &Path,
    root: &Path,
    projects: &mut Vec<JavaProject>,
) -> Result<()> {
    let entries = sorted_entries(directory)?;

    let has_project_dirs = entries
        .iter()
        .any(|entry| matches!(file_name(entry).as_ref(), "in" | "out") && entry.is_dir());
    let has_project_files = entries.iter().any(|entry| {
        let name = file_name(entry);
        name.ends_with("_in.java") || name.ends_with("_out.java")
    });

    if has_project_dirs {
        // One project per subdirectory, qualified by the subdirectory name.
        for entry in entries.iter().filter(|entry| entry.is_dir()) {
            projects.push(read_project_from_directory(entry, root)?);
        }
    } else if has_project_files {
        // One project per file.
        for entry in entries.iter().filter(|entry| entry.is_file()) {
            match read_project_from_file(entry, root)? {
                Some(project) => projects.push(project),
                None => warn!("Skipped, unrecognized file name: {}", entry.display()),
            }
        }
    } else {
        for entry in entries.iter().filter(|entry| entry.is_dir()) {
            find_projects(entry, root, projects)?;
        }
    }

    Ok(())
}

/// Read a project from a single file named `<Unit>_<test>_<qualifier>.java`.
fn read_project_from_file(file: &Path, root: &Path) -> Result<Option<JavaProject>> {
    let name = file_name(file);
    let Some(captures) = PROJECT_FILENAME_REGEX.captures(&name) else {
        return Ok(None);
    };
    let unit = captures[1].to_string();
    let test = captures[2].to_string();
    let qualifier = captures[3].to_string();

    let text = sptgen::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let package = project::package_name(&text).to_string();

    let parent = file.parent().unwrap_or(file);
    let relative = parent.strip_prefix(root).unwrap_or(parent);

    Ok(Some(JavaProject {
        name: test,
        qualifier: Some(qualifier),
        directory: joined_components(relative),
        packages: vec![JavaPackage {
            name: package,
            units: vec![JavaUnit { name: unit, text }],
        }],
    }))
}

/// Read a project from the `*.java` files in a directory, such as an `out`
/// directory, grouping the units by package.
fn read_project_from_directory(directory: &Path, root: &Path) -> Result<JavaProject> {
    let qualifier = file_name(directory).into_owned();
    let parent = directory.parent().unwrap_or(directory);
    let relative = parent.strip_prefix(root).unwrap_or(parent);
    let mut components = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    let name = components
        .pop()
        .unwrap_or_else(|| file_name(parent).into_owned());

    let mut packages: Vec<JavaPackage> = Vec::new();
    for entry in sorted_entries(directory)? {
        if !entry.is_file() || !file_name(&entry).ends_with(".java") {
            continue;
        }
        let text = sptgen::read_to_string(&entry)
            .with_context(|| format!("reading {}", entry.display()))?;
        let package = project::package_name(&text).to_string();
        let unit = JavaUnit {
            name: file_name(&entry)
                .strip_suffix(".java")
                .expect("filtered on the suffix")
                .to_string(),
            text,
        };
        match packages.iter_mut().find(|existing| existing.name == package) {
            Some(existing) => existing.units.push(unit),
            None => packages.push(JavaPackage {
                name: package,
                units: vec![unit],
            }),
        }
    }

    Ok(JavaProject {
        name,
        qualifier: Some(qualifier),
        directory: components.join("/"),
        packages,
    })
}

pub(crate) fn sorted_entries(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(directory)
        .with_context(|| format!("listing {}", directory.display()))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();
    Ok(entries)
}

pub(crate) fn joined_components(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
