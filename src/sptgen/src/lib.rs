//! A library for generating SPT test suites from Java fixture files
//! annotated with inline `[[...]]` declaration/reference markers.
//!
//! A fixture file marks the declarations and references a test cares about:
//!
//! ```java
//! test;
//!
//! [a] {
//! [A]
//! package a;
//! class A { static void [[@1|foo]]() {} }
//! [B]
//! package a;
//! class B { void m() { [[->1|foo|A.foo]](); } }
//! }
//! ```
//!
//! [`read_suite`] parses the markers, reconstructs the marker-free expected
//! text, resolves every reference to its declaration (and optional `&`
//! contexts) by identifier, and assembles a [`TestSuite`] of parse,
//! analysis and reference-retention cases. [`spt::write_suite`] then
//! renders each case as an SPT test, re-projecting the relevant highlights
//! back into the expected text as `[[...]]` selections:
//!
//! ```
//! let text = "class A { [[@1|foo]] int x = [[->1|foo]]; }";
//! let suite = sptgen::read_suite("example", "demo", text).expect("suite");
//! assert_eq!(suite.expected_text, "class A { foo int x = foo; }");
//!
//! let mut out = Vec::new();
//! sptgen::spt::write_suite(&mut out, "refret", None, &suite, &[]).expect("render");
//! let rendered = String::from_utf8(out).expect("utf8 output");
//! assert!(rendered.starts_with("module refret/demo/example\n"));
//! assert!(rendered.contains("run fix-reference(|#2, #1)"));
//! ```
//!
//! Before/after fixture pairs annotated with `{move-class(...)}` go through
//! [`read_refactoring_suite`] instead. Discovery of fixture files and the
//! choice of output location belong to the caller; the library only
//! consumes `(text, name, directory)` triples and produces rendered text.

use std::fs::OpenOptions;
use std::io::Read;
use std::path::Path;

pub mod marker;
pub mod project;
pub mod splice;
pub mod spt;
pub mod suite;

pub use marker::{read_markers, Marker};
pub use suite::{
    read_refactoring_suite, read_refactoring_suite_from_files, read_suite, read_suite_from_file,
    TestCase, TestKind, TestSuite,
};

/// Read file contents into a String using a shared lock.
pub fn read_to_string<P: AsRef<Path>>(path: P) -> std::io::Result<String> {
    let mut file_buff = String::new();

    let mut file = OpenOptions::new().read(true).open(&path)?;
    file.lock_shared()?;
    file.read_to_string(&mut file_buff)?;

    Ok(file_buff)
}
