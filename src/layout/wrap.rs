//! # Caption Wrapping
//!
//! Splits a caption into a fixed number of lines, each with its own maximum
//! width in characters.
//!
//! ## Break Rules
//!
//! Lines are filled left to right from the remaining text. For every line
//! but the last:
//!
//! 1. If the rest fits, it becomes the line.
//! 2. Break at the last space at or before `max`, if that space is at index
//!    8 or later (no stub first segments).
//! 3. Otherwise break before the first digit at index 8 or later, provided
//!    at least 6 characters follow it and it is at or before `max`. This
//!    separates a product name from the article number glued to it.
//! 4. Otherwise cut at exactly `max` characters.
//!
//! The last line keeps as much as fits; if the rest is too long it is
//! elided in the middle, keeping the start and the end (article numbers
//! usually sit at the end):
//!
//! ```text
//! max = 24: "ШУРУП-САМОРЕЗ ПО ДЕРЕВУ ОЦИНКОВАННЫЙ 4.2x76"
//!        →  "ШУРУП-САМОРЕЗ ПО ДЕРЕ…АННЫЙ 4.2x76"
//! ```
//!
//! The output always has exactly one entry per requested line; lines with
//! nothing left to show are empty strings.

/// Character joining the kept start and end of an elided line.
pub const ELLIPSIS: char = '…';

/// Earliest index at which a space or digit break is accepted.
const MIN_BREAK_INDEX: usize = 8;

/// Characters that must follow a digit break.
const DIGIT_BREAK_TAIL: usize = 6;

/// Minimum number of trailing characters kept on an elided line.
const MIN_ELIDED_TAIL: usize = 4;

/// Wrap `text` into `max_per_line.len()` lines.
///
/// ## Example
///
/// ```
/// use stocklabel::layout::wrap::wrap_caption;
///
/// let lines = wrap_caption("Cable ties black 200mm pack of 100", &[28, 26]);
/// assert_eq!(lines, vec!["Cable ties black 200mm pack", "of 100"]);
/// ```
pub fn wrap_caption(text: &str, max_per_line: &[usize]) -> Vec<String> {
    let mut lines = Vec::with_capacity(max_per_line.len());
    let mut rest: Vec<char> = text.trim().chars().collect();

    for (i, &max) in max_per_line.iter().enumerate() {
        let is_last = i + 1 == max_per_line.len();

        if rest.is_empty() {
            lines.push(String::new());
        } else if rest.len() <= max {
            lines.push(rest.drain(..).collect());
        } else if is_last {
            lines.push(elide(&rest, max));
            rest.clear();
        } else {
            let at = break_index(&rest, max);
            let tail = trimmed(&rest[at..]);
            lines.push(trimmed(&rest[..at]).iter().collect());
            rest = tail.to_vec();
        }
    }

    lines
}

/// Where to break a line that does not fit in `max` characters.
fn break_index(rest: &[char], max: usize) -> usize {
    let window = (max + 1).min(rest.len());
    if let Some(space) = rest[..window].iter().rposition(|&c| c == ' ') {
        if (MIN_BREAK_INDEX..=max).contains(&space) {
            return space;
        }
    }

    if rest.len() >= MIN_BREAK_INDEX + DIGIT_BREAK_TAIL {
        let last_allowed = rest.len() - DIGIT_BREAK_TAIL;
        let digit = (MIN_BREAK_INDEX..=last_allowed).find(|&i| rest[i].is_ascii_digit());
        if let Some(digit) = digit {
            if digit <= max {
                return digit;
            }
        }
    }

    max
}

/// Keep the first `max - 3` and the last `max / 2` (at least 4) characters.
fn elide(rest: &[char], max: usize) -> String {
    let head_len = max.saturating_sub(3).min(rest.len());
    let tail_len = (max / 2)
        .max(MIN_ELIDED_TAIL)
        .min(rest.len() - head_len);

    let head = trimmed(&rest[..head_len]);
    let tail = trimmed(&rest[rest.len() - tail_len..]);

    let mut line: String = head.iter().collect();
    line.push(ELLIPSIS);
    line.extend(tail.iter());
    line
}

fn trimmed(chars: &[char]) -> &[char] {
    let start = chars
        .iter()
        .position(|c| !c.is_whitespace())
        .unwrap_or(chars.len());
    let end = chars
        .iter()
        .rposition(|c| !c.is_whitespace())
        .map_or(start, |i| i + 1);
    &chars[start..end]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_empty_input_yields_placeholders() {
        assert_eq!(wrap_caption("", &[28, 26]), vec!["", ""]);
        assert_eq!(wrap_caption("   ", &[24, 24, 24]), vec!["", "", ""]);
    }

    #[test]
    fn test_short_caption_stays_on_first_line() {
        assert_eq!(wrap_caption("Hex bolt M8", &[28, 26]), vec!["Hex bolt M8", ""]);
    }

    #[test]
    fn test_breaks_at_last_space() {
        let lines = wrap_caption("Storage box transparent with lid 20L", &[28, 26]);
        assert_eq!(lines, vec!["Storage box transparent with", "lid 20L"]);
    }

    #[test]
    fn test_ignores_space_too_close_to_start() {
        // Only space is at index 3, so the digit rule applies
        let lines = wrap_caption("Box ABCDEFGHIJKLMNOPQRSTU4006381333931", &[28, 26]);
        assert_eq!(lines, vec!["Box ABCDEFGHIJKLMNOPQRSTU", "4006381333931"]);
    }

    #[test]
    fn test_digit_break_needs_six_trailing_chars() {
        // Digit at index 27 leaves only 3 characters after it
        let text = format!("{}123", "A".repeat(27));
        let lines = wrap_caption(&text, &[20, 26]);
        assert_eq!(lines, vec!["A".repeat(20), format!("{}123", "A".repeat(7))]);
    }

    #[test]
    fn test_digit_break_beyond_max_falls_back_to_hard_split() {
        let text = format!("{}4006381333931", "B".repeat(30));
        let lines = wrap_caption(&text, &[28, 26]);
        assert_eq!(lines[0], "B".repeat(28));
        assert_eq!(lines[1], "BB4006381333931");
    }

    #[test]
    fn test_hard_split_without_breaks() {
        let text = "X".repeat(40);
        let lines = wrap_caption(&text, &[28, 26]);
        assert_eq!(lines, vec!["X".repeat(28), "X".repeat(12)]);
    }

    #[test]
    fn test_last_line_is_elided() {
        let text = format!("{} {}", "A".repeat(20), "B".repeat(60));
        let lines = wrap_caption(&text, &[28, 26]);
        assert_eq!(lines[0], "A".repeat(20));
        assert_eq!(lines[1], format!("{}{}{}", "B".repeat(23), ELLIPSIS, "B".repeat(13)));
    }

    #[test]
    fn test_elision_keeps_start_and_end() {
        let text = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        let lines = wrap_caption(text, &[10]);
        assert_eq!(lines, vec![format!("0123456{}VWXYZ", ELLIPSIS)]);
    }

    #[test]
    fn test_elision_tail_never_overlaps_head() {
        // 25 chars into a 24-wide last line: head 21, tail clamps to 4
        let text: String = ('a'..='y').collect();
        let lines = wrap_caption(&text, &[24]);
        assert_eq!(lines, vec![format!("abcdefghijklmnopqrstu{}vwxy", ELLIPSIS)]);
    }

    #[test]
    fn test_tiny_width_elision_keeps_min_tail() {
        let lines = wrap_caption("ABCDEFGHIJ", &[4]);
        assert_eq!(lines, vec![format!("A{}GHIJ", ELLIPSIS)]);
    }

    #[test]
    fn test_cyrillic_three_lines() {
        let lines = wrap_caption(
            "ПРОДУКЦИЯ ООО РОМАШКА 123456789012345678901234567890",
            &[24, 24, 24],
        );
        assert_eq!(
            lines,
            vec![
                "ПРОДУКЦИЯ ООО РОМАШКА",
                "12345678",
                "9012345678901234567890"
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_exact_line_count(text in "\\PC{0,120}", widths in prop::collection::vec(1usize..40, 1..5)) {
            prop_assert_eq!(wrap_caption(&text, &widths).len(), widths.len());
        }

        #[test]
        fn prop_non_final_lines_fit(text in "[a-zA-Z0-9 ]{0,150}", widths in prop::collection::vec(1usize..40, 1..5)) {
            let lines = wrap_caption(&text, &widths);
            for (line, max) in lines.iter().zip(&widths).take(widths.len() - 1) {
                prop_assert!(line.chars().count() <= *max);
            }
        }
    }
}
