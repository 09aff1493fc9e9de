//! Java test projects assembled into single fixture files.
//!
//! A discovered project holds one or more packages with one or more
//! compilation units each (as required by multi-file Java tests). The
//! project is written out as a single fixture block that a marked-up suite
//! can later be read from.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use once_cell::sync::Lazy;
use regex::Regex;

/// Matches the `package` declaration in a Java compilation unit.
static PACKAGE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*package\s+([^;]+);\s*$").expect("valid package regex"));

/// A Java test project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaProject {
    /// The project name, such as `testStaticImport5`.
    pub name: String,
    /// The project qualifier, such as `in` or `out`; or `None`.
    pub qualifier: Option<String>,
    /// The directory with the project, such as `RenameStaticMethod`.
    pub directory: String,
    /// The packages in the project.
    pub packages: Vec<JavaPackage>,
}

/// A Java package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaPackage {
    /// The name of the package; or an empty string if it has no name.
    pub name: String,
    /// The compilation units in the package.
    pub units: Vec<JavaUnit>,
}

/// A Java compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaUnit {
    /// The name of the compilation unit.
    pub name: String,
    /// The text content of the unit.
    pub text: String,
}

impl JavaProject {
    /// The stem of the fixture file the project is written to, such as
    /// `testStaticImport5_in`.
    pub fn file_stem(&self) -> String {
        match &self.qualifier {
            Some(qualifier) => format!("{}_{}", self.name, qualifier),
            None => self.name.clone(),
        }
    }
}

/// Read the package name from Java source.
///
/// Lenient: a unit without a package declaration yields an empty name
/// rather than an error, so one malformed fixture cannot block a batch run.
pub fn package_name(text: &str) -> &str {
    PACKAGE_REGEX
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str().trim())
        .unwrap_or("")
}

/// Write the project as one fixture block.
pub fn write_fixture<W: Write>(out: &mut W, packages: &[JavaPackage]) -> std::io::Result<()> {
    writeln!(out, "test;")?;
    writeln!(out)?;
    for package in packages {
        writeln!(out, "[{}] {{", package.name)?;
        for unit in &package.units {
            writeln!(out, "[{}]", unit.name)?;
            writeln!(out, "{}", unit.text)?;
        }
        writeln!(out, "}}")?;
    }
    Ok(())
}

/// Write the project as a fixture file in the given directory.
///
/// The file lands at `<output_dir>/<directory>/<stem>.java`. When the file
/// already exists and `force` is not set, nothing is written and `None` is
/// returned; otherwise the written path is returned.
pub fn write_to_file(
    project: &JavaProject,
    output_dir: &Path,
    force: bool,
) -> std::io::Result<Option<PathBuf>> {
    let project_dir = output_dir.join(&project.directory);
    fs::create_dir_all(&project_dir)?;

    let destination = project_dir.join(format!("{}.java", project.file_stem()));
    if !force && destination.exists() {
        return Ok(None);
    }

    let mut buffer = Vec::new();
    write_fixture(&mut buffer, &project.packages)?;

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .open(&destination)?;
    file.lock_exclusive()?;
    file.set_len(0)?;
    file.write_all(&buffer)?;

    Ok(Some(destination))
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::{package_name, write_fixture, JavaPackage, JavaUnit};

    #[test]
    fn extracts_the_package_name() {
        assert_eq!(package_name("package org.example.a;\nclass A {}"), "org.example.a");
        assert_eq!(package_name("  package p ;\nclass A {}"), "p");
    }

    #[test]
    fn missing_package_name_is_empty() {
        assert_eq!(package_name("class A {}"), "");
        assert_eq!(package_name("// package comment only"), "");
    }

    #[test]
    fn assembles_packages_and_units() {
        let packages = [
            JavaPackage {
                name: String::from("a"),
                units: vec![JavaUnit {
                    name: String::from("A"),
                    text: String::from("package a;\nclass A {}"),
                }],
            },
            JavaPackage {
                name: String::from("b"),
                units: vec![
                    JavaUnit {
                        name: String::from("B"),
                        text: String::from("package b;\nclass B {}"),
                    },
                    JavaUnit {
                        name: String::from("C"),
                        text: String::from("package b;\nclass C {}"),
                    },
                ],
            },
        ];

        let mut out = Vec::new();
        write_fixture(&mut out, &packages).expect("write");
        assert_eq!(
            String::from_utf8(out).expect("utf8 output"),
            indoc! {r"
                test;

                [a] {
                [A]
                package a;
                class A {}
                }
                [b] {
                [B]
                package b;
                class B {}
                [C]
                package b;
                class C {}
                }
            "}
        );
    }
}
