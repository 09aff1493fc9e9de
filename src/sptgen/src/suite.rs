//! Test suites generated from marked-up fixture text.
//!
//! A fixture is one Java test file whose relevant declarations and
//! references are surrounded by `[[...]]` markers (see [`crate::marker`]).
//! [`read_suite`] turns one fixture into a [`TestSuite`]: the canonical
//! marker-free expected text, the source-ordered list of [`Highlight`]s, and
//! the test cases to emit. [`read_refactoring_suite`] does the same for a
//! before/after fixture pair annotated with `{move-class(...)}`.

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::path::Path;

use thiserror::Error;

use crate::marker::{self, AnnotationMarker, Marker, Pos};
use crate::splice::replace_all;

// Data model
// ==========

/// A declaration, reference, or context span in the expected text.
///
/// Highlights are addressed by their index in [`TestSuite::highlights`],
/// which equals the source order of the originating markers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Highlight {
    /// A range in the expected text.
    pub range: Range<usize>,
}

/// The kinds of tests a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestKind {
    Parsing,
    Analysis,
    RefRet,
    MoveClass,
}

/// A test suite generated from one fixture.
#[derive(Debug, Clone, PartialEq)]
pub struct TestSuite {
    /// The test suite name, such as `testStaticImport5`.
    pub name: String,
    /// The directory with the fixture, such as `RenameStaticMethod`.
    pub directory: String,
    /// The expected text: the fixture with all markers replaced by their
    /// replacement text.
    pub expected_text: String,
    /// The declaration and reference highlights, ordered from first to last.
    pub highlights: Vec<Highlight>,
    /// The test cases.
    pub cases: Vec<TestCase>,
    /// Whether the test suite is disabled.
    pub is_disabled: bool,
}

/// A test case.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    /// The name of the test.
    pub name: String,
    /// Whether the test is disabled.
    pub is_disabled: bool,
    /// The input content.
    pub content: String,
    /// The kind-specific payload.
    pub kind: CaseKind,
}

/// The kind-specific payload of a [`TestCase`].
#[derive(Debug, Clone, PartialEq)]
pub enum CaseKind {
    /// A plain parse test.
    Parse,
    /// A plain analysis test.
    Analysis,
    /// A `test-analyze` run test.
    TestAnalyze,
    /// A reference-retention test.
    RefRet {
        /// The highlights in the content, ordered from first to last.
        selections: Vec<Highlight>,
        /// The original reference text, to be replaced with the expected
        /// reference.
        original_ref_text: String,
        /// The index of the reference (in `selections`).
        ref_index: usize,
        /// The index of the declaration (in `selections`) to which the
        /// reference should resolve.
        decl_index: usize,
        /// The indices of the contexts (in `selections`) used with the
        /// reference.
        context_indexes: Vec<usize>,
    },
    /// A move-class refactoring test.
    MoveClass {
        /// The expected content after the refactoring.
        expected_content: String,
        /// The highlights in the content, ordered from first to last.
        selections: Vec<Highlight>,
        /// The index of the class to move (in `selections`).
        class_index: usize,
        /// The index of the package to move to (in `selections`).
        package_index: usize,
    },
}

impl TestCase {
    /// Whether the test case is acceptable for the requested `kinds`.
    ///
    /// An empty request accepts every case.
    pub fn is_acceptable(&self, kinds: &[TestKind]) -> bool {
        if kinds.is_empty() {
            return true;
        }
        let kind = match self.kind {
            CaseKind::Parse => TestKind::Parsing,
            CaseKind::Analysis | CaseKind::TestAnalyze => TestKind::Analysis,
            CaseKind::RefRet { .. } => TestKind::RefRet,
            CaseKind::MoveClass { .. } => TestKind::MoveClass,
        };
        kinds.contains(&kind)
    }
}

impl TestSuite {
    /// Whether the suite contains at least one reference-retention case.
    ///
    /// Suites without one come from fixtures with no references and are
    /// usually not worth emitting.
    pub fn has_ref_ret_cases(&self) -> bool {
        self.cases
            .iter()
            .any(|case| matches!(case.kind, CaseKind::RefRet { .. }))
    }
}

// Suite readers
// =============

/// Read a test suite from fixture `text` with markers.
///
/// A declaration is marked with `[[@id|name]]` and a reference with
/// `[[->id|initial|expected]]`, where `id` is the identifier of the
/// declaration to which the reference should resolve, `initial` is the
/// initial (unrefactored, possibly wrong) name of the reference, and
/// `expected` is the expected qualified name. When `expected` is omitted it
/// is assumed to equal `initial`.
///
/// The suite contains a parse case and two analysis cases carrying the
/// expected text, plus one reference-retention case per reference marker,
/// in source order.
///
/// # Errors
///
/// Fails on malformed markers, on a duplicate declaration identifier, and
/// on a reference or context identifier that does not resolve to a
/// declaration in the same text.
pub fn read_suite(name: &str, directory: &str, text: &str) -> Result<TestSuite, Error> {
    let markers = marker::read_markers(text).map_err(|err| err.map_span(text))?;
    check_unique_decls(&markers)?;

    // Build the expected text. At the same time, convert every declaration
    // and reference marker to a highlight, ordered from first to last.
    let mut highlights: Vec<Highlight> = Vec::new();
    let mut highlight_of: HashMap<usize, usize> = HashMap::new();
    let enumerated = markers.iter().enumerate().collect::<Vec<_>>();
    let expected_text = replace_all(
        text,
        enumerated,
        |&(_, marker)| marker.range(),
        |&(index, marker), _, start| {
            if matches!(marker, Marker::Decl(_) | Marker::Ref(_)) {
                highlight_of.insert(index, highlights.len());
                highlights.push(marker.to_highlight(start));
            }
            marker.replacement_text().to_string()
        },
    );

    let is_disabled = has_annotation(&markers, "disabled");

    let mut cases = vec![
        TestCase {
            name: format!("{name}: parse test"),
            is_disabled,
            content: expected_text.clone(),
            kind: CaseKind::Parse,
        },
        TestCase {
            name: format!("{name}: default analysis"),
            is_disabled,
            content: expected_text.clone(),
            kind: CaseKind::Analysis,
        },
        TestCase {
            name: format!("{name}: test analysis"),
            is_disabled,
            content: expected_text.clone(),
            kind: CaseKind::TestAnalyze,
        },
    ];

    // For each reference, find the corresponding declaration and contexts
    // and build a reference-retention case addressing their highlights.
    let mut sequence = 0;
    for (index, marker) in markers.iter().enumerate() {
        let Marker::Ref(reference) = marker else {
            continue;
        };
        sequence += 1;

        let decl = find_decl(&markers, reference.decl_id).ok_or_else(|| {
            Error::UnresolvedReference {
                decl_id: reference.decl_id.to_string(),
                text: reference.text.to_string(),
            }
        })?;
        let ref_index = highlight_index(&highlight_of, index)?;
        let decl_index = highlight_index(&highlight_of, decl)?;
        let mut context_indexes = Vec::with_capacity(reference.context_ids.len());
        for context_id in &reference.context_ids {
            let context = find_decl(&markers, context_id).ok_or_else(|| {
                Error::UnresolvedContext {
                    context_id: context_id.to_string(),
                }
            })?;
            context_indexes.push(highlight_index(&highlight_of, context)?);
        }

        cases.push(TestCase {
            name: format!("{name}: refret test {sequence}"),
            is_disabled,
            content: expected_text.clone(),
            kind: CaseKind::RefRet {
                selections: highlights.clone(),
                original_ref_text: reference.text.to_string(),
                ref_index,
                decl_index,
                context_indexes,
            },
        });
    }

    Ok(TestSuite {
        name: name.to_string(),
        directory: directory.to_string(),
        expected_text,
        highlights,
        cases,
        is_disabled,
    })
}

/// Read a test suite from `file`, deriving the suite name and directory
/// from the path relative to `root`.
pub fn read_suite_from_file(file: &Path, root: &Path) -> Result<TestSuite, Error> {
    let content = crate::read_to_string(file)?;
    let relative = file.strip_prefix(root).unwrap_or(file);
    let directory = relative_directory(relative);
    let file_name = relative
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = file_name.strip_suffix(".java").unwrap_or(&file_name);
    read_suite(name, &directory, &content)
}

/// Read a refactoring test suite from a before/after fixture pair.
///
/// The before content must carry a `[[{move-class(<class-id>,
/// <package-id>)}]]` annotation naming the class declaration to move and
/// the target package declaration; without one the pair holds no
/// refactoring and `None` is returned. Only declaration markers produce
/// highlights; reference markers are still replaced by their expected text.
///
/// The suite contains parse and analysis cases for both the before and the
/// after text, plus one move-class case.
pub fn read_refactoring_suite(
    name: &str,
    directory: &str,
    before_text: &str,
    after_text: &str,
) -> Result<Option<TestSuite>, Error> {
    let markers = marker::read_markers(before_text).map_err(|err| err.map_span(before_text))?;
    check_unique_decls(&markers)?;

    let is_disabled = has_annotation(&markers, "disabled");
    let Some(move_class) = markers.iter().find_map(|marker| match marker {
        Marker::Annotation(annotation)
            if annotation.name == "move-class" && annotation.arguments.len() == 2 =>
        {
            Some(annotation)
        }
        _ => None,
    }) else {
        return Ok(None);
    };
    let class_id = move_class.arguments[0];
    let package_id = move_class.arguments[1];

    // Build the before text without markers, converting the declaration
    // markers to highlights.
    let mut highlights: Vec<Highlight> = Vec::new();
    let mut highlight_of: HashMap<usize, usize> = HashMap::new();
    let enumerated = markers.iter().enumerate().collect::<Vec<_>>();
    let before_content = replace_all(
        before_text,
        enumerated,
        |&(_, marker)| marker.range(),
        |&(index, marker), _, start| {
            if matches!(marker, Marker::Decl(_)) {
                highlight_of.insert(index, highlights.len());
                highlights.push(marker.to_highlight(start));
            }
            marker.replacement_text().to_string()
        },
    );

    // Build the after text without markers.
    let after_markers = marker::read_markers(after_text).map_err(|err| err.map_span(after_text))?;
    let after_content = replace_all(
        after_text,
        after_markers,
        |marker| marker.range(),
        |marker, _, _| marker.replacement_text().to_string(),
    );

    let class = find_decl(&markers, class_id).ok_or_else(|| Error::UnresolvedMoveTarget {
        id: class_id.to_string(),
    })?;
    let package = find_decl(&markers, package_id).ok_or_else(|| Error::UnresolvedMoveTarget {
        id: package_id.to_string(),
    })?;
    let class_index = highlight_index(&highlight_of, class)?;
    let package_index = highlight_index(&highlight_of, package)?;

    let cases = vec![
        TestCase {
            name: format!("{name}: parse 'before' test"),
            is_disabled,
            content: before_content.clone(),
            kind: CaseKind::Parse,
        },
        TestCase {
            name: format!("{name}: parse 'after' test"),
            is_disabled,
            content: after_content.clone(),
            kind: CaseKind::Parse,
        },
        TestCase {
            name: format!("{name}: default 'before' analysis"),
            is_disabled,
            content: before_content.clone(),
            kind: CaseKind::Analysis,
        },
        TestCase {
            name: format!("{name}: default 'after' analysis"),
            is_disabled,
            content: after_content.clone(),
            kind: CaseKind::Analysis,
        },
        TestCase {
            name: format!("{name}: move class test"),
            is_disabled,
            content: before_content.clone(),
            kind: CaseKind::MoveClass {
                expected_content: after_content,
                selections: highlights.clone(),
                class_index,
                package_index,
            },
        },
    ];

    Ok(Some(TestSuite {
        name: name.to_string(),
        directory: directory.to_string(),
        expected_text: before_content,
        highlights,
        cases,
        is_disabled,
    }))
}

/// Read a refactoring test suite from a before/after file pair, deriving
/// the suite name and directory from the before path relative to `root`.
pub fn read_refactoring_suite_from_files(
    before: &Path,
    after: &Path,
    root: &Path,
) -> Result<Option<TestSuite>, Error> {
    let before_content = crate::read_to_string(before)?;
    let after_content = crate::read_to_string(after)?;
    let relative = before.strip_prefix(root).unwrap_or(before);
    let directory = relative_directory(relative);
    let file_name = relative
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = pair_stem(&file_name);
    read_refactoring_suite(name, &directory, &before_content, &after_content)
}

/// The suite name shared by a `_before.java`/`_after.java` pair.
pub fn pair_stem(file_name: &str) -> &str {
    for suffix in ["_before.java", "_after.java", ".java"] {
        if let Some(stem) = file_name.strip_suffix(suffix) {
            return stem;
        }
    }
    file_name
}

fn relative_directory(relative: &Path) -> String {
    relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default()
}

fn check_unique_decls(markers: &[Marker<'_>]) -> Result<(), Error> {
    let mut seen = HashSet::new();
    for marker in markers {
        if let Marker::Decl(decl) = marker {
            if !seen.insert(decl.id) {
                return Err(Error::DuplicateDecl {
                    id: decl.id.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn has_annotation(markers: &[Marker<'_>], name: &str) -> bool {
    markers.iter().any(
        |marker| matches!(marker, Marker::Annotation(AnnotationMarker { name: n, .. }) if *n == name),
    )
}

/// The index of the declaration marker with the given `id`, if any.
fn find_decl(markers: &[Marker<'_>], id: &str) -> Option<usize> {
    markers
        .iter()
        .position(|marker| matches!(marker, Marker::Decl(decl) if decl.id == id))
}

fn highlight_index(highlight_of: &HashMap<usize, usize>, marker: usize) -> Result<usize, Error> {
    highlight_of
        .get(&marker)
        .copied()
        .ok_or(Error::HighlightNotFound)
}

// Errors
// ======

/// Errors raised while reading a test suite.
#[derive(Error, Debug)]
pub enum Error {
    #[error("marker error: {0}")]
    Marker(#[from] marker::Error<Pos>),
    #[error("duplicate declaration `{id}`")]
    DuplicateDecl { id: String },
    #[error("no declaration `{decl_id}` for reference `{text}`")]
    UnresolvedReference { decl_id: String, text: String },
    #[error("no declaration `{context_id}` for context specifier")]
    UnresolvedContext { context_id: String },
    #[error("no declaration `{id}` for `move-class` annotation")]
    UnresolvedMoveTarget { id: String },
    #[error("no highlight recorded for a resolved marker")]
    HighlightNotFound,
    #[error("io error")]
    IO(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{read_refactoring_suite, read_suite, CaseKind, Error, Highlight, TestKind};

    #[test]
    fn declaration_only_fixture() {
        let suite = read_suite("t", "dir", "class A { [[@1|foo]] void m() {} }").expect("suite");

        assert_eq!(suite.expected_text, "class A { foo void m() {} }");
        assert_eq!(suite.highlights, vec![Highlight { range: 10..13 }]);
        assert!(!suite.has_ref_ret_cases());
        assert_eq!(suite.cases.len(), 3);
        assert_eq!(suite.cases[0].name, "t: parse test");
        assert_eq!(suite.cases[0].kind, CaseKind::Parse);
        assert_eq!(suite.cases[1].name, "t: default analysis");
        assert_eq!(suite.cases[2].name, "t: test analysis");
        assert!(!suite.is_disabled);
    }

    #[test]
    fn reference_resolves_to_declaration() {
        let suite = read_suite("t", "", "[[@1|foo]] x [[->1|foo|B.foo]]").expect("suite");

        // Declaration first, reference second, in source order.
        assert_eq!(suite.expected_text, "foo x B.foo");
        assert_eq!(
            suite.highlights,
            vec![Highlight { range: 0..3 }, Highlight { range: 6..11 }]
        );

        let refret = &suite.cases[3];
        assert_eq!(refret.name, "t: refret test 1");
        let CaseKind::RefRet {
            selections,
            original_ref_text,
            ref_index,
            decl_index,
            context_indexes,
        } = &refret.kind
        else {
            panic!("expected a refret case, got {refret:?}");
        };
        assert_eq!(selections, &suite.highlights);
        assert_eq!(original_ref_text, "foo");
        assert_eq!(*ref_index, 1);
        assert_eq!(*decl_index, 0);
        assert!(context_indexes.is_empty());
    }

    #[test]
    fn context_specifiers_resolve_to_declarations() {
        let text = "[[@1|name]] [[@2|C]] [[->1|&2|name]]";
        let suite = read_suite("t", "", text).expect("suite");

        let CaseKind::RefRet {
            ref_index,
            decl_index,
            context_indexes,
            original_ref_text,
            ..
        } = &suite.cases[3].kind
        else {
            panic!("expected a refret case");
        };
        assert_eq!(*ref_index, 2);
        assert_eq!(*decl_index, 0);
        assert_eq!(context_indexes, &vec![1]);
        assert_eq!(original_ref_text, "name");
    }

    #[test]
    fn highlight_order_equals_source_order() {
        let text = "[[->1|b|Q.b]] mid [[@1|b]] end [[->1|b]]";
        let suite = read_suite("t", "", text).expect("suite");

        // Expected text: "Q.b mid b end b".
        assert_eq!(
            suite.highlights,
            vec![
                Highlight { range: 0..3 },
                Highlight { range: 8..9 },
                Highlight { range: 14..15 },
            ]
        );

        // Two references, two refret cases, numbered in source order.
        assert_eq!(suite.cases[3].name, "t: refret test 1");
        assert_eq!(suite.cases[4].name, "t: refret test 2");
        let CaseKind::RefRet {
            ref_index,
            decl_index,
            ..
        } = &suite.cases[3].kind
        else {
            panic!("expected a refret case");
        };
        assert_eq!(*ref_index, 0);
        assert_eq!(*decl_index, 1);
    }

    #[test]
    fn comments_and_annotations_are_stripped() {
        let text = "a [[#note]] b [[{disabled}]] c [[@1|x]]";
        let suite = read_suite("t", "", text).expect("suite");

        assert_eq!(suite.expected_text, "a  b  c x");
        assert_eq!(suite.highlights, vec![Highlight { range: 8..9 }]);
        assert!(suite.is_disabled);
        assert!(suite.cases.iter().all(|case| case.is_disabled));
    }

    #[test]
    fn disabled_annotation_position_does_not_matter() {
        for text in ["[[{disabled}]] [[@1|x]]", "[[@1|x]] [[{disabled}]]"] {
            let suite = read_suite("t", "", text).expect("suite");
            assert!(suite.is_disabled);
        }
    }

    #[test]
    fn unresolved_reference_is_fatal() {
        let err = read_suite("t", "", "[[@1|foo]] [[->9|foo]]").expect_err("unresolved");
        let Error::UnresolvedReference { decl_id, text } = err else {
            panic!("expected an unresolved reference error, got {err:?}");
        };
        assert_eq!(decl_id, "9");
        assert_eq!(text, "foo");
    }

    #[test]
    fn unresolved_context_is_fatal() {
        let err = read_suite("t", "", "[[@1|foo]] [[->1|&9|foo]]").expect_err("unresolved");
        assert!(matches!(err, Error::UnresolvedContext { context_id } if context_id == "9"));
    }

    #[test]
    fn duplicate_declaration_is_fatal() {
        let err = read_suite("t", "", "[[@1|a]] [[@1|b]]").expect_err("duplicate");
        assert!(matches!(err, Error::DuplicateDecl { id } if id == "1"));
    }

    #[test]
    fn case_kind_filtering() {
        let suite = read_suite("t", "", "[[@1|a]] [[->1|a]]").expect("suite");
        let accepted = |kinds: &[TestKind]| {
            suite
                .cases
                .iter()
                .filter(|case| case.is_acceptable(kinds))
                .count()
        };
        assert_eq!(accepted(&[]), 4);
        assert_eq!(accepted(&[TestKind::Parsing]), 1);
        assert_eq!(accepted(&[TestKind::Analysis]), 2);
        assert_eq!(accepted(&[TestKind::RefRet]), 1);
        assert_eq!(accepted(&[TestKind::MoveClass]), 0);
    }

    #[test]
    fn refactoring_pair_without_move_class_annotation_is_skipped() {
        let suite = read_refactoring_suite("t", "", "[[@1|A]] {}", "A {}").expect("read");
        assert!(suite.is_none());
    }

    #[test]
    fn refactoring_pair_builds_move_class_suite() {
        let before = "package [[@1|p]]; class [[@2|A]] {} [[{move-class(2, 1)}]]";
        let after = "package p; class A {}";
        let suite = read_refactoring_suite("t", "d", before, after)
            .expect("read")
            .expect("suite");

        assert_eq!(suite.expected_text, "package p; class A {} ");
        assert_eq!(
            suite.highlights,
            vec![Highlight { range: 8..9 }, Highlight { range: 17..18 }]
        );

        let names = suite
            .cases
            .iter()
            .map(|case| case.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "t: parse 'before' test",
                "t: parse 'after' test",
                "t: default 'before' analysis",
                "t: default 'after' analysis",
                "t: move class test",
            ]
        );

        let CaseKind::MoveClass {
            expected_content,
            class_index,
            package_index,
            ..
        } = &suite.cases[4].kind
        else {
            panic!("expected a move-class case");
        };
        assert_eq!(expected_content, "package p; class A {}");
        assert_eq!(*class_index, 1);
        assert_eq!(*package_index, 0);
    }

    #[test]
    fn refactoring_references_are_replaced_without_highlights() {
        let before = "[[@1|p]] [[@2|A]] [[->2|A|p.A]] [[{move-class(2, 1)}]]";
        let suite = read_refactoring_suite("t", "", before, "p A p.A")
            .expect("read")
            .expect("suite");
        assert_eq!(suite.expected_text, "p A p.A ");
        assert_eq!(suite.highlights.len(), 2);
    }
}
