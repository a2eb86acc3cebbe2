//! Breakscaping: escaping reserved bitmark sequences in free text
//!
//!     Text embedded in markup must not be read back as structure. Breakscaping inserts the
//!     escape marker `^` wherever the text would otherwise open a tag, a mark or a block, and
//!     unbreakscaping removes exactly those markers again.
//!
//!     The rules depend on the text format and the location of the text:
//!
//!         1. A run of `^` gains one extra `^` (bitmark text, or any text in a tag).
//!         2. A doubled half-mark (`**`, ``` `` ```, `__`, `!!`, `==`) is split as `*^*` (bitmark text).
//!         3. In a tag, `]` becomes `^]` unless the source already escaped it.
//!         4. In a bitmark body, a run of `#`, `|` or `•` at column 0 is followed by `^`.
//!         5. In a bitmark body, `[` followed by a tag trigger becomes `[^`.
//!         6. In a plain text body, `[.` at column 0 (with any carets between) gains one caret.
//!
//!     Unbreakscaping is the exact left inverse: bitmark text and tags lose one `^` per run,
//!     plain bodies lose one caret from a column 0 `[^.` sequence. Both directions are a single
//!     pass over the characters and are total.

use crate::model::{TextFormat, TextLocation};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters that open a tag when they follow `[`
pub const TAG_TRIGGERS: &[char] = &[
    '.', '@', '#', '▼', '►', '%', '!', '?', '+', '-', '$', '_', '=', '&',
];

/// Half of a paired inline mark delimiter
pub const HALF_MARKS: &[char] = &['*', '`', '_', '!', '='];

/// Block markers that are only significant at the start of a line
const LINE_START_BLOCKS: &[char] = &['#', '|', '•'];

static CODE_LINE_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(\||•|#)").unwrap());

/// Options for [`breakscape`] and [`unbreakscape`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BreakscapeOptions {
    pub format: TextFormat,
    pub location: TextLocation,
}

impl BreakscapeOptions {
    pub fn new(format: TextFormat, location: TextLocation) -> Self {
        Self { format, location }
    }
}

/// A string whose reserved sequences have already been escaped.
///
/// Kept distinct from `String` so escaped text is never escaped twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreakscapedString(String);

impl BreakscapedString {
    /// Wrap text that is already known to be escaped (or needs no escaping)
    pub fn from_escaped(s: impl Into<String>) -> Self {
        BreakscapedString(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Join escaped values without escaping them again
    pub fn concat<'a>(parts: impl IntoIterator<Item = &'a BreakscapedString>) -> Self {
        BreakscapedString(parts.into_iter().map(|p| p.0.as_str()).collect())
    }

    pub fn push(&mut self, other: &BreakscapedString) {
        self.0.push_str(&other.0);
    }
}

impl fmt::Display for BreakscapedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BreakscapedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn run_end(src: &[char], start: usize, ch: char) -> usize {
    let mut end = start;
    while end < src.len() && src[end] == ch {
        end += 1;
    }
    end
}

/// Escape `text` so it reads back literally under `options`
pub fn breakscape(text: &str, options: BreakscapeOptions) -> BreakscapedString {
    let bitmark_text = options.format.is_bitmark_text();
    let in_body = options.location == TextLocation::Body;
    let in_tag = options.location == TextLocation::Tag;

    let src: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + text.len() / 10 + 2);
    let mut line_start = true;
    let mut i = 0;

    while i < src.len() {
        let ch = src[i];
        let next = src.get(i + 1).copied();

        if ch == '\n' {
            out.push('\n');
            line_start = true;
            i += 1;
            continue;
        }
        let at_line_start = line_start;
        line_start = false;

        if ch == '^' && (bitmark_text || in_tag) {
            let end = run_end(&src, i, '^');
            out.push('^');
            out.extend(&src[i..end]);
            i = end;
            continue;
        }

        if bitmark_text && HALF_MARKS.contains(&ch) {
            out.push(ch);
            if next == Some(ch) {
                out.push('^');
            }
            i += 1;
            continue;
        }

        if in_tag && ch == ']' && (i == 0 || src[i - 1] != '^') {
            out.push_str("^]");
            i += 1;
            continue;
        }

        if in_body && bitmark_text {
            if at_line_start && LINE_START_BLOCKS.contains(&ch) {
                let end = run_end(&src, i, ch);
                out.extend(&src[i..end]);
                // a following caret run gets its own extra caret
                if src.get(end) != Some(&'^') {
                    out.push('^');
                }
                i = end;
                continue;
            }

            if ch == '[' && next.is_some_and(|c| TAG_TRIGGERS.contains(&c)) {
                out.push_str("[^");
                i += 1;
                continue;
            }
        }

        if in_body && !bitmark_text && at_line_start && ch == '[' {
            let end = run_end(&src, i + 1, '^');
            if src.get(end) == Some(&'.') {
                out.push('[');
                for _ in i..end {
                    out.push('^');
                }
                i = end;
                continue;
            }
        }

        out.push(ch);
        i += 1;
    }

    BreakscapedString(out)
}

/// Remove the escaping added by [`breakscape`] under the same `options`.
///
/// Sequences that were not produced by breakscaping are passed through unchanged.
pub fn unbreakscape(text: &str, options: BreakscapeOptions) -> String {
    let bitmark_text = options.format.is_bitmark_text();
    let remove_hats = bitmark_text || options.location == TextLocation::Tag;
    let plain_body = options.location == TextLocation::Body && !bitmark_text;

    let src: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut line_start = true;
    let mut i = 0;

    while i < src.len() {
        let ch = src[i];
        let at_line_start = line_start;
        line_start = ch == '\n';

        if remove_hats && ch == '^' {
            let end = run_end(&src, i, '^');
            out.extend(&src[i + 1..end]);
            i = end;
            continue;
        }

        if plain_body && at_line_start && ch == '[' {
            let end = run_end(&src, i + 1, '^');
            if end > i + 1 && src.get(end) == Some(&'.') {
                out.push('[');
                out.extend(&src[i + 2..end]);
                out.push('.');
                i = end + 1;
                continue;
            }
        }

        out.push(ch);
        i += 1;
    }

    out
}

/// Escape code block content for plain text output: block markers at line start gain a `^`
pub fn breakscape_code(text: &str) -> BreakscapedString {
    BreakscapedString(CODE_LINE_START.replace_all(text, "$1^").into_owned())
}

/// Breakscape every string of a slice
pub fn breakscape_all<S: AsRef<str>>(
    values: &[S],
    options: BreakscapeOptions,
) -> Vec<BreakscapedString> {
    values
        .iter()
        .map(|v| breakscape(v.as_ref(), options))
        .collect()
}

/// Unbreakscape every string of a slice
pub fn unbreakscape_all<S: AsRef<str>>(values: &[S], options: BreakscapeOptions) -> Vec<String> {
    values
        .iter()
        .map(|v| unbreakscape(v.as_ref(), options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> BreakscapeOptions {
        BreakscapeOptions::default()
    }

    fn tag() -> BreakscapeOptions {
        BreakscapeOptions::new(TextFormat::BitmarkPlusPlus, TextLocation::Tag)
    }

    fn plain_body() -> BreakscapeOptions {
        BreakscapeOptions::new(TextFormat::Text, TextLocation::Body)
    }

    fn plain_tag() -> BreakscapeOptions {
        BreakscapeOptions::new(TextFormat::Text, TextLocation::Tag)
    }

    #[test]
    fn splits_doubled_half_marks() {
        assert_eq!(breakscape("a**b", body()).as_str(), "a*^*b");
        assert_eq!(breakscape("x===y", body()).as_str(), "x=^=^=y");
        assert_eq!(breakscape("a*b", body()).as_str(), "a*b");
    }

    #[test]
    fn escapes_tag_openers_in_body() {
        assert_eq!(breakscape("[.article]", body()).as_str(), "[^.article]");
        assert_eq!(breakscape("see [@id:1]", body()).as_str(), "see [^@id:1]");
        assert_eq!(breakscape("[x]", body()).as_str(), "[x]");
    }

    #[test]
    fn escapes_line_start_blocks() {
        assert_eq!(breakscape("# title", body()).as_str(), "#^ title");
        assert_eq!(breakscape("a\n### b", body()).as_str(), "a\n###^ b");
        assert_eq!(breakscape("• item", body()).as_str(), "•^ item");
        assert_eq!(breakscape("a # b", body()).as_str(), "a # b");
        assert_eq!(breakscape(" # b", body()).as_str(), " # b");
    }

    #[test]
    fn line_start_block_followed_by_hats() {
        let escaped = breakscape("##^x", body());
        assert_eq!(escaped.as_str(), "##^^x");
        assert_eq!(unbreakscape(escaped.as_str(), body()), "##^x");
    }

    #[test]
    fn adds_one_hat_per_run() {
        assert_eq!(breakscape("a^b^^c", body()).as_str(), "a^^b^^^c");
        assert_eq!(unbreakscape("a^^b^^^c", body()), "a^b^^c");
    }

    #[test]
    fn escapes_closing_bracket_in_tags() {
        assert_eq!(breakscape("a]b", tag()).as_str(), "a^]b");
        assert_eq!(breakscape("a^]b", tag()).as_str(), "a^^]b");
        assert_eq!(breakscape("a]b", plain_tag()).as_str(), "a^]b");
        assert_eq!(breakscape("[.x", tag()).as_str(), "[.x");
    }

    #[test]
    fn plain_body_only_escapes_bit_start() {
        assert_eq!(breakscape("[.article]", plain_body()).as_str(), "[^.article]");
        assert_eq!(breakscape("[^^.a", plain_body()).as_str(), "[^^^.a");
        assert_eq!(breakscape("a **b** ^", plain_body()).as_str(), "a **b** ^");
        assert_eq!(breakscape(" [.a", plain_body()).as_str(), " [.a");
        assert_eq!(unbreakscape("[^^^.a", plain_body()), "[^^.a");
    }

    #[test]
    fn plain_body_unbreakscape_requires_column_zero() {
        assert_eq!(unbreakscape(" [^.a", plain_body()), " [^.a");
        assert_eq!(unbreakscape("x\n[^.a", plain_body()), "x\n[.a");
    }

    #[test]
    fn malformed_sequences_pass_through() {
        assert_eq!(unbreakscape("[^x", plain_body()), "[^x");
        assert_eq!(unbreakscape("no escapes", body()), "no escapes");
    }

    #[test]
    fn code_breakscape_marks_line_start_blocks() {
        assert_eq!(breakscape_code("|code\n#x\na|b").as_str(), "|^code\n#^x\na|b");
    }

    #[test]
    fn concat_does_not_escape_again() {
        let a = breakscape("a**", body());
        let b = BreakscapedString::from_escaped("[^.x");
        assert_eq!(BreakscapedString::concat([&a, &b]).as_str(), "a*^*[^.x");
    }

    #[test]
    fn batch_helpers_map_each_value() {
        let escaped = breakscape_all(&["[.a", "b"], body());
        assert_eq!(escaped[0].as_str(), "[^.a");
        let plain = unbreakscape_all(&["[^.a", "b"], body());
        assert_eq!(plain, vec!["[.a".to_string(), "b".to_string()]);
    }
}
