//! Text AST to bitmark text
//!
//! Generation is a single depth-first walk that appends to a buffer. The walk itself is the pure
//! function [`walk_ast`]: settings and an initial [`WalkState`] in, output and final state out.
//! [`TextGenerator`] drives it, once normally, or twice when the plain text divider may be used:
//! a dry run discovers how much of the leading text is plain-text safe, and the real pass is
//! seeded with only that boundary.
//!
//! Marks on a text node are never nested. A single standard mark uses its shorthand
//! (`**bold**`); anything else becomes one inline wrapper followed by the mark list:
//!
//!     ==text==|bold|color:red|
//!
//! Adjacent writes are kept apart: when the buffer ends with a half mark and the next write
//! starts with the same character, or a body ends with `[` and the next write starts with a tag
//! trigger, a `^` goes in between.

use super::ast::{TextMark, TextMarkType, TextNode, TextNodeType};
use super::walk::{walk, Descend, Route, TextVisitor};
use crate::breakscape::{
    breakscape, breakscape_code, BreakscapeOptions, BreakscapedString, HALF_MARKS, TAG_TRIGGERS,
};
use crate::model::{TextFormat, TextLocation};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Marks the start of plain text inside a bitmark body
pub const PLAIN_TEXT_DIVIDER: &str = "==== text ====";

const INLINE_MARK: &str = "==";

static LINK_SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(https?://|mailto:)").unwrap());

/// Body bit nodes keyed by their `[!n]` placeholder
pub type Placeholders = IndexMap<String, TextNode>;

/// Renders a body bit in place of its placeholder. Returning `None` keeps the placeholder.
pub type BodyBitRenderer<'r> = dyn FnMut(&TextNode, usize) -> Option<String> + 'r;

fn shorthand(mark_type: TextMarkType) -> Option<&'static str> {
    match mark_type {
        TextMarkType::Bold => Some("**"),
        TextMarkType::Light => Some("``"),
        TextMarkType::Italic => Some("__"),
        TextMarkType::Highlight => Some("!!"),
        _ => None,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

/// Token written for a mark after an inline wrapper, if any
fn mark_token(mark: &TextMark) -> Option<String> {
    match mark.mark_type {
        TextMarkType::Link => mark.attr_str("href").map(|href| format!("link:{href}")),
        TextMarkType::Comment => mark.attr_str("comment").map(|comment| format!("#{comment}")),
        TextMarkType::Unknown => None,
        mark_type => {
            let mut token = mark_type.as_str().to_string();
            for (key, value) in mark.attrs.iter().flatten() {
                let written = match key.as_str() {
                    "language" => value.as_str() != Some("plain text"),
                    "color" | "name" | "duration" => true,
                    _ => false,
                };
                if written {
                    token.push(':');
                    token.push_str(&value_text(value));
                }
            }
            Some(token)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextGeneratorOptions {
    /// Allow the `==== text ====` divider in front of plain-text safe leading text
    pub plain_text_divider_allowed: bool,
}

/// State carried into and out of one walk
#[derive(Debug, Clone, Default)]
pub struct WalkState {
    /// Number of leading root paragraph children that are plain-text safe
    pub pre_text_end: Option<usize>,
    pub placeholders: Placeholders,
}

#[derive(Debug, Clone, Copy)]
pub struct WalkSettings {
    pub format: TextFormat,
    pub location: TextLocation,
    /// Suppress output; used to probe for the plain text boundary
    pub dry_run: bool,
}

/// Walks `ast` once. A dry run computes `pre_text_end`; a real run seeded with one emits the
/// divider.
pub fn walk_ast<'b, 'r>(
    ast: &[TextNode],
    settings: WalkSettings,
    state: WalkState,
    body_bits: Option<&'b mut BodyBitRenderer<'r>>,
) -> (String, WalkState) {
    let pre_text = match (settings.dry_run, state.pre_text_end) {
        (true, _) => PreText::Probe {
            eligible: true,
            end: None,
        },
        (false, Some(end)) => PreText::Emit {
            end,
            held: String::new(),
            flushed: false,
        },
        (false, None) => PreText::Off,
    };
    let mut writer = Writer {
        format: settings.format,
        location: settings.location,
        dry_run: settings.dry_run,
        out: String::new(),
        indent: 0,
        in_code_block: false,
        exited_code_block: false,
        paragraphs: 0,
        placeholders: state.placeholders,
        body_bits,
        pre_text,
    };
    walk(ast, &mut writer);

    let pre_text_end = match writer.pre_text {
        PreText::Probe { end, .. } => end,
        PreText::Emit { end, .. } => Some(end),
        PreText::Off => None,
    };
    (
        writer.out,
        WalkState {
            pre_text_end,
            placeholders: writer.placeholders,
        },
    )
}

enum PreText {
    Off,
    Probe {
        eligible: bool,
        end: Option<usize>,
    },
    Emit {
        end: usize,
        held: String,
        flushed: bool,
    },
}

struct Writer<'b, 'r> {
    format: TextFormat,
    location: TextLocation,
    dry_run: bool,
    out: String,
    indent: usize,
    in_code_block: bool,
    exited_code_block: bool,
    paragraphs: usize,
    placeholders: Placeholders,
    body_bits: Option<&'b mut BodyBitRenderer<'r>>,
    pre_text: PreText,
}

impl Writer<'_, '_> {
    fn options(&self) -> BreakscapeOptions {
        BreakscapeOptions::new(self.format, self.location)
    }

    fn write(&mut self, s: &str) {
        if self.dry_run || s.is_empty() {
            return;
        }
        if self.format == TextFormat::BitmarkPlusPlus {
            if let (Some(last), Some(next)) = (self.out.chars().last(), s.chars().next()) {
                let doubled_half_mark = last == next && HALF_MARKS.contains(&last);
                let opens_tag = self.location == TextLocation::Body
                    && last == '['
                    && TAG_TRIGGERS.contains(&next);
                if doubled_half_mark || opens_tag {
                    self.out.push('^');
                }
            }
        }
        self.out.push_str(s);
    }

    fn write_nl(&mut self) {
        self.write("\n");
    }

    fn indentation(&self) -> String {
        "\t".repeat(self.indent.saturating_sub(1))
    }

    fn escape(&self, text: &str) -> String {
        let escaped = if self.in_code_block && !self.format.is_bitmark_text() {
            breakscape_code(text)
        } else {
            breakscape(text, self.options())
        };
        let escaped = escaped.into_string();
        if self.indent > 1 {
            escaped.replace('\n', &format!("\n{}", self.indentation()))
        } else {
            escaped
        }
    }

    /// Handles the leading children of the root paragraph. `Some` short-circuits normal output.
    fn enter_pre_text(&mut self, node: &TextNode, route: Route<'_, '_>) -> Option<Descend> {
        if route.depth() != 1 {
            return None;
        }
        let options = self.options();
        match &mut self.pre_text {
            PreText::Off => None,
            PreText::Probe { eligible, end } => {
                if *eligible {
                    let plain = node.marks.is_none()
                        && node
                            .text
                            .as_deref()
                            .is_some_and(|text| breakscape(text, options).as_str() == text);
                    match node.node_type {
                        TextNodeType::Text if plain => *end = Some(route.index + 1),
                        TextNodeType::HardBreak if end.is_some() => {}
                        _ => *eligible = false,
                    }
                }
                None
            }
            PreText::Emit { end, held, flushed } => {
                if *flushed {
                    return None;
                }
                if route.index < *end {
                    let plain = BreakscapeOptions::new(TextFormat::Text, TextLocation::Body);
                    match node.node_type {
                        TextNodeType::Text => {
                            let text = node.text.as_deref().unwrap_or_default();
                            held.push_str(breakscape(text, plain).as_str());
                        }
                        TextNodeType::HardBreak => held.push('\n'),
                        _ => {}
                    }
                    return Some(Descend::Skip);
                }
                self.flush_pre_text();
                None
            }
        }
    }

    fn flush_pre_text(&mut self) {
        if let PreText::Emit { held, flushed, .. } = &mut self.pre_text {
            if *flushed {
                return;
            }
            *flushed = true;
            let held = std::mem::take(held);
            self.write(PLAIN_TEXT_DIVIDER);
            self.write_nl();
            self.write(&held);
        }
    }

    fn write_paragraph(&mut self, route: Route<'_, '_>) {
        let in_list = route.ancestors.iter().any(|a| a.node_type.is_list());
        let first = self.paragraphs == 0;
        if !in_list {
            self.paragraphs += 1;
        }
        if self.exited_code_block {
            self.write("|");
            self.write_nl();
            self.write_nl();
        } else if self.format == TextFormat::BitmarkPlusPlus && !first && !in_list {
            self.write("|");
            self.write_nl();
        }
    }

    fn write_hard_break(&mut self) {
        self.write_nl();
        if self.indent > 1 {
            let indentation = self.indentation();
            self.write(&indentation);
        }
    }

    fn write_text(&mut self, node: &TextNode) {
        let Some(text) = node.text.as_deref() else {
            return;
        };
        let escaped = self.escape(text);
        let Some(marks) = &node.marks else {
            self.write(&escaped);
            return;
        };

        if let [mark] = marks.as_slice() {
            if mark.mark_type == TextMarkType::Link {
                if let Some(href) = mark.attr_str("href") {
                    if LINK_SCHEME.replace(href, "") == escaped {
                        self.write(href);
                        return;
                    }
                }
            }
            if let Some(delimiter) = shorthand(mark.mark_type) {
                self.write(delimiter);
                self.write(&escaped);
                self.write(delimiter);
                return;
            }
        }

        self.write(INLINE_MARK);
        self.write(&escaped);
        self.write(INLINE_MARK);
        let tokens: Vec<String> = marks.iter().filter_map(mark_token).collect();
        if !tokens.is_empty() {
            self.write(&format!("|{}|", tokens.join("|")));
        }
    }

    fn write_heading(&mut self, node: &TextNode) {
        let level = node.attr_u64("level").unwrap_or(1).clamp(1, 6) as usize;
        self.write(&format!("{} ", "#".repeat(level)));
    }

    fn write_section(&mut self, node: &TextNode) {
        match node.attr_str("section") {
            Some(section) => self.write(&format!("|{section}: ")),
            None => self.write("|"),
        }
    }

    fn write_bullet(&mut self, node: &TextNode, route: Route<'_, '_>) {
        let Some(list) = route.parent() else {
            return;
        };
        let number = list.attr_u64("start").unwrap_or(1) + route.index as u64;
        let glyph = match list.node_type {
            TextNodeType::BulletList => "•".to_string(),
            TextNodeType::NoBulletList => "•_".to_string(),
            TextNodeType::OrderedList => format!("•{number}"),
            TextNodeType::OrderedListRoman => format!("•{number}I"),
            TextNodeType::OrderedListRomanLower => format!("•{number}i"),
            TextNodeType::LetteredList => "•A".to_string(),
            TextNodeType::LetteredListLower => "•a".to_string(),
            TextNodeType::TaskList if node.attr_bool("checked") => "•+".to_string(),
            TextNodeType::TaskList => "•-".to_string(),
            _ => return,
        };
        let bullet = format!("{}{glyph} ", self.indentation());
        self.write(&bullet);
    }

    fn write_image(&mut self, node: &TextNode) {
        let Some(src) = node.attr_str("src") else {
            return;
        };
        let inline = node.node_type == TextNodeType::ImageInline;
        let mut s = String::new();
        if inline {
            if let Some(alt) = node.attr_str("alt") {
                s.push_str(INLINE_MARK);
                s.push_str(breakscape(alt, self.options()).as_str());
                s.push_str(INLINE_MARK);
            }
        }
        s.push_str(&format!("|image:{src}|"));

        for (key, value) in node.attrs.iter().flatten() {
            let text = value_text(value);
            match key.as_str() {
                "src" => {}
                "alt" if inline => {}
                "textAlign" => {
                    if text != "left" && is_truthy(value) {
                        s.push_str(&format!("@captionAlign:{text}|"));
                    }
                }
                "title" => {
                    if is_truthy(value) {
                        s.push_str(&format!("@caption:{text}|"));
                    }
                }
                "class" => {
                    if text != "center" && is_truthy(value) {
                        s.push_str(&format!("@align:{text}|"));
                    }
                }
                "comment" => {
                    if is_truthy(value) {
                        s.push_str(&format!("#{text}|"));
                    }
                }
                _ => {
                    if is_truthy(value) {
                        s.push_str(&format!("@{key}:{text}|"));
                    }
                }
            }
        }
        self.write(&s);
    }

    fn write_code_block(&mut self, node: &TextNode) {
        match node.attr_str("language") {
            Some(language) => self.write(&format!("|code:{language}\n")),
            None => self.write("|code\n"),
        }
    }

    fn write_latex(&mut self, node: &TextNode) {
        let formula = node
            .attr_str("formula")
            .or(node.text.as_deref())
            .unwrap_or_default();
        let escaped = breakscape(formula, self.options());
        self.write(INLINE_MARK);
        self.write(escaped.as_str());
        self.write(INLINE_MARK);
        self.write("|latex|");
    }

    fn write_body_bit(&mut self, node: &TextNode) {
        let index = self.placeholders.len();
        let placeholder = format!("[!{index}]");
        let rendered = if self.dry_run {
            None
        } else {
            match self.body_bits.as_deref_mut() {
                Some(render) => render(node, index),
                None => None,
            }
        };
        match rendered {
            Some(rendered) => self.write(&rendered),
            None => self.write(&placeholder),
        }
        self.placeholders.insert(placeholder, node.clone());
    }
}

impl TextVisitor for Writer<'_, '_> {
    fn enter(&mut self, node: &TextNode, route: Route<'_, '_>) -> Descend {
        if let Some(descend) = self.enter_pre_text(node, route) {
            return descend;
        }

        let descend = match node.node_type {
            TextNodeType::Paragraph => {
                self.write_paragraph(route);
                Descend::Children
            }
            TextNodeType::HardBreak => {
                self.write_hard_break();
                Descend::Skip
            }
            TextNodeType::Text => {
                self.write_text(node);
                Descend::Skip
            }
            TextNodeType::Heading => {
                self.write_heading(node);
                Descend::Children
            }
            TextNodeType::Section => {
                self.write_section(node);
                Descend::Children
            }
            TextNodeType::ListItem | TextNodeType::TaskItem => {
                self.write_bullet(node, route);
                Descend::Children
            }
            TextNodeType::Image | TextNodeType::ImageInline => {
                self.write_image(node);
                Descend::Skip
            }
            TextNodeType::CodeBlock => {
                self.in_code_block = true;
                self.write_code_block(node);
                Descend::Children
            }
            TextNodeType::Latex => {
                self.write_latex(node);
                Descend::Skip
            }
            list if list.is_list() => {
                self.indent += 1;
                Descend::Children
            }
            body_bit if body_bit.is_body_bit() => {
                self.write_body_bit(node);
                Descend::Skip
            }
            _ => Descend::Skip,
        };

        self.exited_code_block = false;
        descend
    }

    fn exit(&mut self, node: &TextNode, route: Route<'_, '_>) {
        match node.node_type {
            TextNodeType::Paragraph => {
                if route.depth() == 0 {
                    self.flush_pre_text();
                }
                if self.format != TextFormat::BitmarkMinusMinus {
                    self.write_nl();
                }
            }
            TextNodeType::Heading | TextNodeType::Section | TextNodeType::Image => {
                self.write_nl();
                self.write_nl();
            }
            TextNodeType::CodeBlock => {
                self.write_nl();
                self.write_nl();
                self.in_code_block = false;
                self.exited_code_block = true;
            }
            list if list.is_list() => {
                if self.indent <= 1 {
                    self.write_nl();
                }
                self.indent = self.indent.saturating_sub(1);
            }
            _ => {}
        }
    }
}

/// Generates bitmark text from a text AST.
///
/// One instance serves one generation at a time; the placeholders of the last call stay
/// available until the next one.
#[derive(Debug, Default)]
pub struct TextGenerator {
    options: TextGeneratorOptions,
    placeholders: Placeholders,
}

impl TextGenerator {
    pub fn new(options: TextGeneratorOptions) -> Self {
        TextGenerator {
            options,
            placeholders: Placeholders::new(),
        }
    }

    pub fn generate_sync(
        &mut self,
        ast: &[TextNode],
        format: TextFormat,
        location: TextLocation,
    ) -> BreakscapedString {
        self.generate(ast, format, location, None)
    }

    /// Generates text, letting `body_bits` render body bits in place of their placeholders
    pub fn generate(
        &mut self,
        ast: &[TextNode],
        format: TextFormat,
        location: TextLocation,
        body_bits: Option<&mut BodyBitRenderer<'_>>,
    ) -> BreakscapedString {
        let settings = WalkSettings {
            format,
            location,
            dry_run: false,
        };

        let mut state = WalkState::default();
        if self.pre_text_possible(ast, format, location) {
            let (_, probed) = walk_ast(
                ast,
                WalkSettings {
                    dry_run: true,
                    ..settings
                },
                WalkState::default(),
                None,
            );
            debug!(boundary = ?probed.pre_text_end, "plain text boundary");
            state.pre_text_end = probed.pre_text_end;
        }

        let (output, state) = walk_ast(ast, settings, state, body_bits);
        self.placeholders = state.placeholders;
        BreakscapedString::from_escaped(output)
    }

    /// Body bits of the last generation, keyed by placeholder
    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    fn pre_text_possible(&self, ast: &[TextNode], format: TextFormat, location: TextLocation) -> bool {
        self.options.plain_text_divider_allowed
            && format == TextFormat::BitmarkPlusPlus
            && location == TextLocation::Body
            && matches!(ast, [root] if root.node_type == TextNodeType::Paragraph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::ast::TextMark;

    fn generate(ast: &[TextNode]) -> String {
        TextGenerator::default()
            .generate_sync(ast, TextFormat::BitmarkPlusPlus, TextLocation::Body)
            .into_string()
    }

    fn para(content: Vec<TextNode>) -> Vec<TextNode> {
        vec![TextNode::paragraph(content)]
    }

    fn marked(text: &str, marks: Vec<TextMark>) -> TextNode {
        TextNode::text(text).with_marks(marks)
    }

    #[test]
    fn combines_marks_into_one_inline_wrapper() {
        let node = marked(
            "hi",
            vec![
                TextMark::new(TextMarkType::Bold),
                TextMark::new(TextMarkType::Color).with_attr("color", "red"),
            ],
        );
        let out = generate(&para(vec![node]));
        insta::assert_snapshot!(out.trim_end(), @"==hi==|bold|color:red|");
    }

    #[test]
    fn single_standard_mark_uses_shorthand() {
        let out = generate(&para(vec![marked("hi", vec![TextMark::new(TextMarkType::Bold)])]));
        assert_eq!(out, "**hi**\n");
    }

    #[test]
    fn empty_mark_list_is_a_bare_inline_wrapper() {
        let out = generate(&para(vec![marked("hi", vec![])]));
        assert_eq!(out, "==hi==\n");
    }

    #[test]
    fn code_mark_skips_plain_text_language() {
        let plain = TextMark::new(TextMarkType::Code).with_attr("language", "plain text");
        let rust = TextMark::new(TextMarkType::Code).with_attr("language", "rust");
        assert_eq!(generate(&para(vec![marked("x", vec![plain])])), "==x==|code|\n");
        assert_eq!(generate(&para(vec![marked("x", vec![rust])])), "==x==|code:rust|\n");
    }

    #[test]
    fn comment_mark() {
        let comment = TextMark::new(TextMarkType::Comment).with_attr("comment", "check");
        let out = generate(&para(vec![marked("x", vec![comment])]));
        assert_eq!(out, "==x==|#check|\n");
    }

    #[test]
    fn separates_adjacent_half_marks() {
        let out = generate(&para(vec![TextNode::text("a*"), TextNode::text("*b")]));
        assert_eq!(out, "a*^*b\n");

        let out = generate(&para(vec![marked("b*", vec![TextMark::new(TextMarkType::Bold)])]));
        assert_eq!(out, "**b*^**\n");
    }

    #[test]
    fn separates_bracket_from_tag_trigger() {
        let out = generate(&para(vec![TextNode::text("see ["), TextNode::text(".x")]));
        assert_eq!(out, "see [^.x\n");
    }

    #[test]
    fn bitmark_minus_minus_has_no_token_separation() {
        let ast = para(vec![TextNode::text("a*"), TextNode::text("*b")]);
        let out = TextGenerator::default().generate_sync(
            &ast,
            TextFormat::BitmarkMinusMinus,
            TextLocation::Body,
        );
        assert_eq!(out.as_str(), "a**b");
    }

    #[test]
    fn autolinks_when_text_matches_href() {
        let link = TextMark::new(TextMarkType::Link).with_attr("href", "https://example.com");
        let out = generate(&para(vec![marked("example.com", vec![link.clone()])]));
        assert_eq!(out, "https://example.com\n");

        let out = generate(&para(vec![marked("site", vec![link])]));
        assert_eq!(out, "==site==|link:https://example.com|\n");
    }

    #[test]
    fn paragraphs_headings_and_sections() {
        let heading = TextNode::new(TextNodeType::Heading)
            .with_attr("level", 2)
            .with_content(vec![TextNode::text("Title")]);
        let section = TextNode::new(TextNodeType::Section)
            .with_attr("section", "footer")
            .with_content(vec![TextNode::text("end")]);
        let ast = vec![
            heading,
            TextNode::paragraph(vec![TextNode::text("one")]),
            TextNode::paragraph(vec![TextNode::text("two")]),
            section,
        ];
        assert_eq!(generate(&ast), "## Title\n\none\n|\ntwo\n|footer: end\n\n");
    }

    #[test]
    fn heading_level_is_clamped() {
        let heading = |level: u64| {
            vec![TextNode::new(TextNodeType::Heading)
                .with_attr("level", level)
                .with_content(vec![TextNode::text("T")])]
        };
        let deep = generate(&heading(u64::MAX));
        assert!(deep.starts_with("###### T"));
        assert!(!deep.starts_with("#######"));
        assert!(generate(&heading(0)).starts_with("# T"));
    }

    #[test]
    fn lists_with_nesting() {
        let item = |text: &str, nested: Option<TextNode>| {
            let mut content = vec![TextNode::paragraph(vec![TextNode::text(text)])];
            content.extend(nested);
            TextNode::new(TextNodeType::ListItem).with_content(content)
        };
        let inner = TextNode::new(TextNodeType::BulletList).with_content(vec![item("b", None)]);
        let outer = TextNode::new(TextNodeType::BulletList)
            .with_content(vec![item("a", Some(inner)), item("c", None)]);
        assert_eq!(generate(&[outer]), "• a\n\t• b\n• c\n\n");
    }

    #[test]
    fn ordered_and_task_bullets() {
        let item = |text: &str| {
            TextNode::new(TextNodeType::ListItem)
                .with_content(vec![TextNode::paragraph(vec![TextNode::text(text)])])
        };
        let ordered = TextNode::new(TextNodeType::OrderedList)
            .with_attr("start", 3)
            .with_content(vec![item("a"), item("b")]);
        assert_eq!(generate(&[ordered]), "•3 a\n•4 b\n\n");

        let task = |checked: bool| {
            TextNode::new(TextNodeType::TaskItem)
                .with_attr("checked", checked)
                .with_content(vec![TextNode::paragraph(vec![TextNode::text("t")])])
        };
        let tasks = TextNode::new(TextNodeType::TaskList).with_content(vec![task(true), task(false)]);
        assert_eq!(generate(&[tasks]), "•+ t\n•- t\n\n");
    }

    #[test]
    fn code_block_followed_by_paragraph() {
        let code = TextNode::new(TextNodeType::CodeBlock)
            .with_attr("language", "rust")
            .with_content(vec![TextNode::text("let x = 1;")]);
        let ast = vec![code, TextNode::paragraph(vec![TextNode::text("after")])];
        assert_eq!(generate(&ast), "|code:rust\nlet x = 1;\n\n|\n\nafter\n");
    }

    #[test]
    fn image_attributes() {
        let image = TextNode::new(TextNodeType::Image)
            .with_attr("src", "a.png")
            .with_attr("title", "Cap")
            .with_attr("class", "center")
            .with_attr("textAlign", "left")
            .with_attr("width", 100)
            .with_attr("comment", "check");
        insta::assert_snapshot!(generate(&[image]).trim_end(), @"|image:a.png|@caption:Cap|@width:100|#check|");
    }

    #[test]
    fn latex_formula() {
        let latex = TextNode::new(TextNodeType::Latex).with_attr("formula", "x^2");
        assert_eq!(generate(&para(vec![latex])), "==x^^2==|latex|\n");
    }

    #[test]
    fn body_bits_become_placeholders() {
        let gap = TextNode::new(TextNodeType::Gap).with_attr("solutions", vec!["a"]);
        let ast = para(vec![TextNode::text("Fill "), gap.clone(), TextNode::text(".")]);
        let mut generator = TextGenerator::default();
        let out = generator.generate_sync(&ast, TextFormat::BitmarkPlusPlus, TextLocation::Body);
        assert_eq!(out.as_str(), "Fill [!0].\n");
        assert_eq!(generator.placeholders().get("[!0]"), Some(&gap));

        generator.generate_sync(&para(vec![]), TextFormat::BitmarkPlusPlus, TextLocation::Body);
        assert!(generator.placeholders().is_empty());
    }

    #[test]
    fn body_bit_renderer_replaces_placeholder() {
        let ast = para(vec![TextNode::new(TextNodeType::Select)]);
        let mut render = |_node: &TextNode, index: usize| Some(format!("[-choice{index}]"));
        let out = TextGenerator::default().generate(
            &ast,
            TextFormat::BitmarkPlusPlus,
            TextLocation::Body,
            Some(&mut render),
        );
        assert_eq!(out.as_str(), "[-choice0]\n");
    }

    #[test]
    fn unknown_nodes_are_skipped() {
        let unknown = TextNode::new(TextNodeType::Unknown).with_content(vec![TextNode::text("x")]);
        assert_eq!(generate(&para(vec![TextNode::text("a"), unknown])), "a\n");
    }

    mod pre_text {
        use super::*;

        fn generate_with_divider(ast: &[TextNode]) -> String {
            TextGenerator::new(TextGeneratorOptions {
                plain_text_divider_allowed: true,
            })
            .generate_sync(ast, TextFormat::BitmarkPlusPlus, TextLocation::Body)
            .into_string()
        }

        #[test]
        fn whole_plain_paragraph_follows_the_divider() {
            let ast = para(vec![
                TextNode::text("plain"),
                TextNode::hard_break(),
                TextNode::text("more"),
            ]);
            assert_eq!(generate_with_divider(&ast), "==== text ====\nplain\nmore\n");
        }

        #[test]
        fn divider_is_written_at_the_boundary() {
            let ast = para(vec![
                TextNode::text("plain "),
                marked("bold", vec![TextMark::new(TextMarkType::Bold)]),
            ]);
            assert_eq!(generate_with_divider(&ast), "==== text ====\nplain **bold**\n");
        }

        #[test]
        fn escaped_text_is_not_plain() {
            let ast = para(vec![TextNode::text("a**b")]);
            assert_eq!(generate_with_divider(&ast), "a*^*b\n");
        }

        #[test]
        fn only_for_a_single_root_paragraph() {
            let ast = vec![
                TextNode::paragraph(vec![TextNode::text("a")]),
                TextNode::paragraph(vec![TextNode::text("b")]),
            ];
            assert_eq!(generate_with_divider(&ast), "a\n|\nb\n");
        }

        #[test]
        fn off_unless_allowed() {
            let ast = para(vec![TextNode::text("plain")]);
            assert_eq!(generate(&ast), "plain\n");
        }
    }
}
