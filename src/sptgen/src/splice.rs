//! A single-pass, offset-correcting text splicer.
//!
//! This is the text-reconstruction primitive shared by the suite readers
//! (stripping markers out of fixture text) and the SPT renderer (injecting
//! bracket highlights back into expected text).

use std::ops::Range;

/// Replace the range of every item in `items` inside `text`.
///
/// All replacements are computed against the *original* text but applied
/// left-to-right with a running offset correction, so items may be supplied
/// in any order. The `replace` callback receives the item, the current
/// contents of its range, and the final start offset the replacement will
/// occupy in the output; callers that need to know where their text landed
/// (e.g. to record a [`Highlight`](crate::suite::Highlight)) read it from
/// there.
///
/// Item ranges must not overlap; this is a precondition of the caller, not
/// checked here.
pub fn replace_all<T, I, R, F>(text: &str, items: I, range_of: R, mut replace: F) -> String
where
    I: IntoIterator<Item = T>,
    R: Fn(&T) -> Range<usize>,
    F: FnMut(&T, &str, usize) -> String,
{
    let mut items = items.into_iter().collect::<Vec<_>>();
    items.sort_by_key(|item| range_of(item).start);

    let mut buffer = String::from(text);
    let mut adjustment = 0isize;
    for item in &items {
        let range = range_of(item);
        let start = (range.start as isize + adjustment) as usize;
        let end = (range.end as isize + adjustment) as usize;
        let replacement = replace(item, &buffer[start..end], start);
        adjustment += replacement.len() as isize - (end - start) as isize;
        buffer.replace_range(start..end, &replacement);
    }

    buffer
}

#[cfg(test)]
mod tests {
    use std::ops::Range;

    use super::replace_all;

    fn apply(text: &str, items: &[(Range<usize>, &str)]) -> String {
        replace_all(text, items, |(range, _)| range.clone(), |(_, new), _, _| {
            new.to_string()
        })
    }

    #[test]
    fn empty_items_return_the_input_unchanged() {
        for text in ["", "x", "no markers here"] {
            assert_eq!(apply(text, &[]), text);
        }
    }

    #[test]
    fn replacements_may_shrink_and_grow() {
        //          0123456789
        let text = "aa BB cc D";
        let items = [(3..5, "longer"), (9..10, "")];
        assert_eq!(apply(text, &items), "aa longer cc ");
    }

    #[test]
    fn items_are_applied_in_range_order_regardless_of_input_order() {
        let text = "one two three";
        let items = [(8..13, "3"), (0..3, "1"), (4..7, "2")];
        assert_eq!(apply(text, &items), "1 2 3");
    }

    #[test]
    fn output_length_accounts_for_every_replacement() {
        let text = "abcdefghij";
        let items: [(Range<usize>, &str); 3] = [(0..2, "xxxx"), (4..5, ""), (7..10, "y")];
        let expected_len = text.len() as isize
            + items
                .iter()
                .map(|(range, new)| new.len() as isize - range.len() as isize)
                .sum::<isize>();
        assert_eq!(apply(text, &items).len(), expected_len as usize);
    }

    #[test]
    fn untouched_regions_survive_contiguously() {
        let text = "keep [drop] keep [drop] keep";
        let items = [(5..11, ""), (17..23, "")];
        assert_eq!(apply(text, &items), "keep  keep  keep");
    }

    #[test]
    fn callback_sees_the_final_start_offset() {
        let text = "[xx] mid [yy]";
        let mut starts = Vec::new();
        let out = replace_all(
            text,
            [(0..4, "a"), (9..13, "b")],
            |(range, _)| range.clone(),
            |(_, new), original, start| {
                assert!(original.starts_with('['));
                starts.push(start);
                new.to_string()
            },
        );
        assert_eq!(out, "a mid b");
        assert_eq!(starts, vec![0, 6]);
    }

    #[test]
    fn callback_sees_the_original_substring() {
        let text = "ab cd";
        replace_all(
            text,
            [(0..2, ()), (3..5, ())],
            |(range, _)| range.clone(),
            |_, original, start| {
                match start {
                    0 => assert_eq!(original, "ab"),
                    _ => assert_eq!(original, "cd"),
                }
                original.to_string()
            },
        );
    }
}
