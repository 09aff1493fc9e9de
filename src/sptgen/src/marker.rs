//! Reading inline `[[...]]` markers from fixture text.
//!
//! A marker is a bracketed annotation embedded in fixture source, matching
//! the grammar `[[<operator>(|<argument>)*]]`. The operator prefix selects
//! the marker kind:
//!
//! - `@<id>`: a declaration; the first argument is its literal text.
//!   For example, `[[@1|foo]]` declares a member named `foo`.
//! - `-><id>`: a reference to the declaration with that identifier; the
//!   first plain argument is the input name, the optional second one the
//!   expected (qualified) name. Arguments prefixed with `&` name context
//!   declarations. For example, `[[->1|foo|B.foo]]` is a reference to
//!   `[[@1|foo]]` in class `B`.
//! - `{<name>}` or `{<name>(<args>)}`: an out-of-band annotation such as
//!   `{disabled}` or `{move-class(1, 2)}`.
//! - `#`: a comment; consumes its span and carries no payload.

use std::fmt::Display;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::suite::Highlight;

/// Matches one marker: an operator (no `|` or `]` characters) followed by
/// zero or more `|`-delimited arguments.
static MARKER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^|\]]+)((?:\|[^|\]]+)*)\]\]").expect("valid marker regex"));

// Data model
// ==========

/// A marker read from fixture text.
///
/// Markers are transient: they borrow from the input text and are consumed
/// while building a [`TestSuite`](crate::suite::TestSuite).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker<'a> {
    Decl(DeclMarker<'a>),
    Ref(RefMarker<'a>),
    Annotation(AnnotationMarker<'a>),
    Comment(CommentMarker),
}

/// A declaration marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclMarker<'a> {
    /// The identifier of the declaration, unique within one input text.
    pub id: &'a str,
    /// The literal text of the declaration.
    pub text: &'a str,
    /// The range of the whole marker in the source text.
    pub range: Range<usize>,
}

/// A reference marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefMarker<'a> {
    /// The identifier of the declaration to which the reference resolves.
    pub decl_id: &'a str,
    /// The identifiers of the context declarations, in argument order.
    pub context_ids: Vec<&'a str>,
    /// The input text of the reference.
    pub text: &'a str,
    /// The expected text of the reference; equals [`Self::text`] when the
    /// marker gives no second name.
    pub expected_text: &'a str,
    /// The range of the whole marker in the source text.
    pub range: Range<usize>,
}

/// An annotation marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationMarker<'a> {
    /// The annotation name, such as `disabled`.
    pub name: &'a str,
    /// The annotation arguments; empty when the name has no `(...)` group.
    pub arguments: Vec<&'a str>,
    /// The range of the whole marker in the source text.
    pub range: Range<usize>,
}

/// A comment marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentMarker {
    /// The range of the whole marker in the source text.
    pub range: Range<usize>,
}

impl Marker<'_> {
    /// The range of the whole marker in the source text.
    pub fn range(&self) -> Range<usize> {
        match self {
            Marker::Decl(decl) => decl.range.clone(),
            Marker::Ref(reference) => reference.range.clone(),
            Marker::Annotation(annotation) => annotation.range.clone(),
            Marker::Comment(comment) => comment.range.clone(),
        }
    }

    /// The text that replaces the marker in the expected text: the literal
    /// text for a declaration, the expected text for a reference, and the
    /// empty string for annotations and comments.
    pub fn replacement_text(&self) -> &str {
        match self {
            Marker::Decl(decl) => decl.text,
            Marker::Ref(reference) => reference.expected_text,
            Marker::Annotation(_) | Marker::Comment(_) => "",
        }
    }

    /// Project the marker to a [`Highlight`] given the final start offset of
    /// its replacement text in the expected text.
    pub fn to_highlight(&self, start: usize) -> Highlight {
        Highlight {
            range: start..start + self.replacement_text().len(),
        }
    }
}

// Reading
// =======

/// Read all markers in `text`, in source order.
///
/// The scan is a single left-to-right pass, so the returned markers are
/// ordered by their start offset and never overlap.
///
/// # Errors
///
/// Fails on the first malformed marker: an unrecognized operator prefix, a
/// declaration without a text argument, or a reference without an input
/// name. A malformed marker means a broken fixture that its author must
/// fix, so there is no per-marker recovery.
pub fn read_markers(text: &str) -> Result<Vec<Marker<'_>>, Error<usize>> {
    let mut markers = Vec::new();

    for captures in MARKER_REGEX.captures_iter(text) {
        let whole = captures.get(0).expect("group 0 always participates");
        let range = whole.start()..whole.end();
        let operator = captures
            .get(1)
            .expect("operator group always participates")
            .as_str();
        let arguments = split_arguments(captures.get(2).map_or("", |group| group.as_str()));

        let marker = if operator.starts_with('@') {
            read_decl(operator, &arguments, range)?
        } else if operator.starts_with("->") {
            read_ref(operator, &arguments, range)?
        } else if operator.starts_with('{') {
            read_annotation(operator, range)
        } else if operator.starts_with('#') {
            Marker::Comment(CommentMarker { range })
        } else {
            return Err(Error::UnknownOperator {
                operator: operator.to_string(),
                pos: range.start,
            });
        };

        markers.push(marker);
    }

    Ok(markers)
}

/// Split the raw argument tail (`|a|b`, or empty) into its segments.
fn split_arguments(raw: &str) -> Vec<&str> {
    if raw.is_empty() {
        Vec::new()
    } else {
        // The grammar guarantees a leading `|` on a non-empty tail.
        raw[1..].split('|').collect()
    }
}

fn read_decl<'a>(
    operator: &'a str,
    arguments: &[&'a str],
    range: Range<usize>,
) -> Result<Marker<'a>, Error<usize>> {
    let id = operator[1..].trim();
    let Some(&text) = arguments.first() else {
        return Err(Error::MissingDeclText {
            operator: operator.to_string(),
            pos: range.start,
        });
    };
    Ok(Marker::Decl(DeclMarker { id, text, range }))
}

fn read_ref<'a>(
    operator: &'a str,
    arguments: &[&'a str],
    range: Range<usize>,
) -> Result<Marker<'a>, Error<usize>> {
    let decl_id = operator[2..].trim();
    let context_ids = arguments
        .iter()
        .filter_map(|argument| argument.strip_prefix('&'))
        .map(str::trim)
        .collect();
    // Plain arguments: neither context specifiers nor stray operators.
    let mut names = arguments.iter().copied().filter(|argument| {
        !argument.starts_with('&') && !argument.starts_with('@') && !argument.starts_with("->")
    });
    let Some(text) = names.next() else {
        return Err(Error::MissingRefText {
            operator: operator.to_string(),
            pos: range.start,
        });
    };
    let expected_text = names.next().unwrap_or(text);
    Ok(Marker::Ref(RefMarker {
        decl_id,
        context_ids,
        text,
        expected_text,
        range,
    }))
}

fn read_annotation(operator: &str, range: Range<usize>) -> Marker<'_> {
    let body = operator.strip_prefix('{').expect("dispatched on `{` prefix");
    let body = body.strip_suffix('}').unwrap_or(body);
    let (name, arguments) = match body.split_once('(') {
        Some((name, tail)) => {
            let tail = tail.split_once(')').map_or(tail, |(arguments, _)| arguments);
            (name, tail.split(',').map(str::trim).collect())
        }
        None => (body, Vec::new()),
    };
    Marker::Annotation(AnnotationMarker {
        name,
        arguments,
        range,
    })
}

// Errors
// ======

/// A marker reading error, generic over the position representation `P`.
///
/// [`read_markers`] reports byte offsets; use [`Error::map_span`] to turn
/// them into line/column positions for reporting.
#[derive(Error, Debug, Eq, PartialEq)]
pub enum Error<P: Display> {
    #[error("unknown operator `{operator}` at {pos}")]
    UnknownOperator { operator: String, pos: P },
    #[error("declaration `{operator}` at {pos} has no text argument")]
    MissingDeclText { operator: String, pos: P },
    #[error("reference `{operator}` at {pos} has no input name argument")]
    MissingRefText { operator: String, pos: P },
}

impl Error<usize> {
    /// Map the byte offset carried by the error to a line/column [`Pos`]
    /// within `input`.
    pub fn map_span(self, input: &str) -> Error<Pos> {
        use Error::*;
        match self {
            UnknownOperator {
                operator,
                pos: offset,
            } => UnknownOperator {
                operator,
                pos: Pos::from(offset, input),
            },
            MissingDeclText {
                operator,
                pos: offset,
            } => MissingDeclText {
                operator,
                pos: Pos::from(offset, input),
            },
            MissingRefText {
                operator,
                pos: offset,
            } => MissingRefText {
                operator,
                pos: Pos::from(offset, input),
            },
        }
    }
}

/// A 1-based line/column position in an input text.
#[derive(Debug, Eq, PartialEq)]
pub struct Pos {
    line: usize,
    column: usize,
}

impl Pos {
    fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    fn from(offset: usize, input: &str) -> Pos {
        let mut line = 1;
        let mut column = 1;
        for (index, ch) in input.char_indices() {
            if index >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Pos::new(line, column)
    }
}

impl Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self { line, column } = self;
        write!(f, "line {line}, column {column}")
    }
}
