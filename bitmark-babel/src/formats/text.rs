//! Plain text format: the text content of an AST without any markup

use crate::error::BitmarkError;
use crate::format::Format;
use crate::text::{walk, Descend, Route, TextAst, TextNode, TextNodeType, TextVisitor};

/// Format implementation for plain text output
pub struct PlainTextFormat;

#[derive(Default)]
struct TextCollector {
    out: String,
}

impl TextVisitor for TextCollector {
    fn enter(&mut self, node: &TextNode, _route: Route<'_, '_>) -> Descend {
        match node.node_type {
            TextNodeType::Text => {
                if let Some(text) = &node.text {
                    self.out.push_str(text);
                }
            }
            TextNodeType::HardBreak => self.out.push('\n'),
            TextNodeType::Latex => {
                if let Some(formula) = node.attr_str("formula").or(node.text.as_deref()) {
                    self.out.push_str(formula);
                }
            }
            TextNodeType::Image | TextNodeType::ImageInline => {
                if let Some(alt) = node.attr_str("alt") {
                    self.out.push_str(alt);
                }
            }
            t if t.is_body_bit() => return Descend::Skip,
            TextNodeType::Unknown => return Descend::Skip,
            _ => {}
        }
        Descend::Children
    }

    fn exit(&mut self, node: &TextNode, _route: Route<'_, '_>) {
        if matches!(
            node.node_type,
            TextNodeType::Paragraph
                | TextNodeType::Heading
                | TextNodeType::Section
                | TextNodeType::CodeBlock
        ) && !self.out.ends_with('\n')
        {
            self.out.push('\n');
        }
    }
}

/// Text content of `ast`, one line per block
pub fn plain_text(ast: &[TextNode]) -> String {
    let mut collector = TextCollector::default();
    walk(ast, &mut collector);
    collector.out.trim_end_matches('\n').to_string()
}

impl Format for PlainTextFormat {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Text content without markup"
    }

    fn file_extensions(&self) -> &[&str] {
        &["txt"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, ast: &TextAst) -> Result<String, BitmarkError> {
        Ok(plain_text(ast))
    }
}
