//! Support for SPT test-suite files.
//!
//! An SPT file holds one module of tests. Each test wraps a content block in
//! `[[ ... ]]`; spans inside the block that are themselves bracketed with
//! `[[ ... ]]` become selections that the test expectation addresses
//! positionally as `#1`, `#2`, ... in left-to-right order.

pub mod writer;

use std::collections::HashMap;
use std::io::Write;

use crate::splice::replace_all;
use crate::suite::{CaseKind, Highlight, TestCase, TestKind, TestSuite};

/// Write the suite as one SPT module.
///
/// Only cases acceptable for the requested `kinds` are written; an empty
/// `kinds` writes all of them. Disabled cases are wrapped in a block
/// comment so the downstream test runner skips them.
pub fn write_suite<W: Write>(
    out: &mut W,
    module_prefix: &str,
    submodule: Option<&str>,
    suite: &TestSuite,
    kinds: &[TestKind],
) -> std::io::Result<()> {
    writeln!(out, "module {}", module_name(module_prefix, submodule, suite))?;
    for case in suite.cases.iter().filter(|case| case.is_acceptable(kinds)) {
        write_case(out, case)?;
    }
    writeln!(out)?;
    Ok(())
}

/// The module name, such as `refret/analysis/RenameMethod/test1`.
fn module_name(module_prefix: &str, submodule: Option<&str>, suite: &TestSuite) -> String {
    [
        Some(module_prefix),
        submodule,
        Some(suite.directory.as_str()),
        Some(suite.name.as_str()),
    ]
    .into_iter()
    .flatten()
    .filter(|component| !component.trim().is_empty())
    .collect::<Vec<_>>()
    .join("/")
    .replace("//", "/")
}

fn write_case<W: Write>(out: &mut W, case: &TestCase) -> std::io::Result<()> {
    let no_substitutions = HashMap::new();

    writeln!(out)?;
    if case.is_disabled {
        writeln!(out, "/*")?;
    }
    writeln!(out, "test {} [[", case.name)?;
    match &case.kind {
        CaseKind::Parse => {
            write_content(out, &case.content, &[], &no_substitutions)?;
            writeln!(out, "]] parse succeeds")?;
        }
        CaseKind::Analysis => {
            write_content(out, &case.content, &[], &no_substitutions)?;
            writeln!(out, "]] analysis succeeds")?;
        }
        CaseKind::TestAnalyze => {
            write_content(out, &case.content, &[], &no_substitutions)?;
            writeln!(out, "]] run test-analyze to SUCCEED()")?;
        }
        CaseKind::RefRet {
            selections,
            original_ref_text,
            ref_index,
            decl_index,
            context_indexes,
        } => {
            let reference = selections[*ref_index].clone();
            let declaration = selections[*decl_index].clone();
            let mut selected = vec![reference.clone(), declaration];
            selected.extend(context_indexes.iter().map(|&index| selections[index].clone()));
            let substitutions = HashMap::from([(reference, original_ref_text.as_str())]);

            let positions = operands(*ref_index, *decl_index, context_indexes);
            write_content(out, &case.content, &selected, &substitutions)?;
            writeln!(out, "]] run fix-reference(|{}) to [[", positions.join(", "))?;
            write_content(out, &case.content, &[], &no_substitutions)?;
            writeln!(out, "]]")?;
        }
        CaseKind::MoveClass {
            expected_content,
            selections,
            class_index,
            package_index,
        } => {
            let selected = vec![
                selections[*class_index].clone(),
                selections[*package_index].clone(),
            ];

            let positions = operands(*class_index, *package_index, &[]);
            write_content(out, &case.content, &selected, &no_substitutions)?;
            writeln!(out, "]] run move-class(|{}) to [[", positions.join(", "))?;
            write_content(out, expected_content, &[], &no_substitutions)?;
            writeln!(out, "]]")?;
        }
    }
    if case.is_disabled {
        writeln!(out, "*/")?;
    }
    Ok(())
}

/// The positional `#n` operands for the primary, secondary and context
/// selections, in that operand order.
///
/// `n` is the 1-based position of each selection in the rendered content
/// block, i.e. ascending highlight-list index; the downstream runner
/// addresses selections by their left-to-right occurrence, not by operand
/// order.
fn operands(primary: usize, secondary: usize, contexts: &[usize]) -> Vec<String> {
    // (operand slot, highlight index); a stable sort by highlight index
    // yields each slot's position in the rendered block.
    let mut slots = vec![(0usize, primary), (1usize, secondary)];
    slots.extend(
        contexts
            .iter()
            .enumerate()
            .map(|(slot, &index)| (slot + 2, index)),
    );
    let mut sorted = slots.clone();
    sorted.sort_by_key(|&(_, index)| index);

    slots
        .iter()
        .map(|&(slot, _)| {
            let position = sorted
                .iter()
                .position(|&(other, _)| other == slot)
                .expect("every slot occurs in its own sort");
            format!("#{}", position + 1)
        })
        .collect()
}

/// Write a test content block, bracketing every selection in `[[ ... ]]`
/// (with the substitution text instead of the selection's own text where
/// one is given) and indenting every non-blank line by two spaces.
fn write_content<W: Write>(
    out: &mut W,
    content: &str,
    selections: &[Highlight],
    substitutions: &HashMap<Highlight, &str>,
) -> std::io::Result<()> {
    let marked = replace_all(
        content,
        selections.to_vec(),
        |highlight| highlight.range.clone(),
        |highlight, original, _| {
            let text = substitutions.get(highlight).copied().unwrap_or(original);
            format!("[[{text}]]")
        },
    );
    for line in marked.lines() {
        if line.is_empty() {
            writeln!(out)?;
        } else {
            writeln!(out, "  {line}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use crate::suite::{read_refactoring_suite, read_suite, TestKind};

    use super::{operands, write_suite};

    fn render(suite: &crate::suite::TestSuite, kinds: &[TestKind]) -> String {
        let mut out = Vec::new();
        write_suite(&mut out, "refret", None, suite, kinds).expect("write");
        String::from_utf8(out).expect("utf8 output")
    }

    #[test]
    fn renders_a_parse_case() {
        let suite = read_suite("test1", "Dir", "class A { [[@1|foo]] }").expect("suite");
        let out = render(&suite, &[TestKind::Parsing]);
        assert_eq!(
            out,
            indoc! {r"
                module refret/Dir/test1

                test test1: parse test [[
                  class A { foo }
                ]] parse succeeds

            "}
        );
    }

    #[test]
    fn renders_analysis_cases() {
        let suite = read_suite("test1", "", "x [[@1|y]]").expect("suite");
        let out = render(&suite, &[TestKind::Analysis]);
        assert_eq!(
            out,
            indoc! {r"
                module refret/test1

                test test1: default analysis [[
                  x y
                ]] analysis succeeds

                test test1: test analysis [[
                  x y
                ]] run test-analyze to SUCCEED()

            "}
        );
    }

    #[test]
    fn renders_a_refret_case_with_substituted_reference() {
        let suite = read_suite("test1", "", "[[@1|foo]] x [[->1|foo|B.foo]]").expect("suite");
        let out = render(&suite, &[TestKind::RefRet]);
        assert_eq!(
            out,
            indoc! {r"
                module refret/test1

                test test1: refret test 1 [[
                  [[foo]] x [[foo]]
                ]] run fix-reference(|#2, #1) to [[
                  foo x B.foo
                ]]

            "}
        );
    }

    #[test]
    fn renders_context_operands_in_block_position_order() {
        let text = "[[@2|C]] [[->1|&2|name]] [[@1|name]]";
        let suite = read_suite("t", "", text).expect("suite");
        let out = render(&suite, &[TestKind::RefRet]);
        assert_eq!(
            out,
            indoc! {r"
                module refret/t

                test t: refret test 1 [[
                  [[C]] [[name]] [[name]]
                ]] run fix-reference(|#2, #3, #1) to [[
                  C name name
                ]]

            "}
        );
    }

    #[test]
    fn renders_a_disabled_suite_in_block_comments() {
        let suite = read_suite("t", "", "[[{disabled}]][[@1|x]]").expect("suite");
        let out = render(&suite, &[TestKind::Parsing]);
        assert_eq!(
            out,
            indoc! {r"
                module refret/t

                /*
                test t: parse test [[
                  x
                ]] parse succeeds
                */

            "}
        );
    }

    #[test]
    fn renders_a_move_class_case() {
        let before = "package [[@1|p]]; class [[@2|A]] {}[[{move-class(2, 1)}]]";
        let after = "package p; class A {}";
        let suite = read_refactoring_suite("t", "d", before, after)
            .expect("read")
            .expect("suite");
        let mut out = Vec::new();
        write_suite(&mut out, "refactoring", None, &suite, &[TestKind::MoveClass]).expect("write");
        assert_eq!(
            String::from_utf8(out).expect("utf8 output"),
            indoc! {r"
                module refactoring/d/t

                test t: move class test [[
                  package [[p]]; class [[A]] {}
                ]] run move-class(|#2, #1) to [[
                  package p; class A {}
                ]]

            "}
        );
    }

    #[test]
    fn blank_content_lines_stay_blank() {
        let suite = read_suite("t", "", "a\n\nb [[@1|x]]").expect("suite");
        let out = render(&suite, &[TestKind::Parsing]);
        assert_eq!(
            out,
            "module refret/t\n\ntest t: parse test [[\n  a\n\n  b x\n]] parse succeeds\n\n"
        );
    }

    #[test]
    fn operand_positions_follow_highlight_indices() {
        // ref at highlight 2, decl at 0, contexts at 1 and 3: rendered
        // positions are decl=1, ctx0=2, ref=3, ctx1=4.
        assert_eq!(operands(2, 0, &[1, 3]), vec!["#3", "#1", "#2", "#4"]);
        // No contexts: ref before decl in the block.
        assert_eq!(operands(0, 1, &[]), vec!["#1", "#2"]);
        assert_eq!(operands(1, 0, &[]), vec!["#2", "#1"]);
    }
}
