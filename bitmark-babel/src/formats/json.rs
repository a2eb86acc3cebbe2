//! JSON format: the text AST in its wire form
//!
//! Parsing accepts an array of nodes or a single node. Unknown node and mark types are kept as
//! `unknown`, unknown fields are carried along unchanged.

use crate::error::BitmarkError;
use crate::format::Format;
use crate::text::{TextAst, TextNode};
use serde::Deserialize;

/// Format implementation for text AST JSON
pub struct JsonFormat;

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonSource {
    Nodes(TextAst),
    Node(TextNode),
}

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Text AST as JSON"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<TextAst, BitmarkError> {
        match serde_json::from_str(source)? {
            JsonSource::Nodes(nodes) => Ok(nodes),
            JsonSource::Node(node) => Ok(vec![node]),
        }
    }

    fn serialize(&self, ast: &TextAst) -> Result<String, BitmarkError> {
        serde_json::to_string_pretty(ast)
            .map_err(|err| BitmarkError::SerializationError(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{TextMarkType, TextNodeType};

    #[test]
    fn parses_array_and_single_node() {
        let ast = JsonFormat
            .parse(r#"[{"type":"paragraph","content":[{"type":"text","text":"hi","marks":[{"type":"bold"}]}]}]"#)
            .unwrap();
        assert_eq!(ast[0].node_type, TextNodeType::Paragraph);
        let text = &ast[0].children()[0];
        assert_eq!(text.text.as_deref(), Some("hi"));
        assert_eq!(text.marks.as_ref().unwrap()[0].mark_type, TextMarkType::Bold);

        let single = JsonFormat.parse(r#"{"type":"text","text":"x"}"#).unwrap();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn unknown_types_are_kept() {
        let ast = JsonFormat
            .parse(r#"[{"type":"footnote","note":"n"}]"#)
            .unwrap();
        assert_eq!(ast[0].node_type, TextNodeType::Unknown);
        assert_eq!(ast[0].extra["note"], "n");
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let result = JsonFormat.parse("[{");
        assert!(matches!(result, Err(BitmarkError::ParseError(_))));
    }

    #[test]
    fn serializes_without_empty_fields() {
        let out = JsonFormat
            .serialize(&vec![TextNode::paragraph(vec![TextNode::text("a")])])
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"type": "paragraph", "content": [{"type": "text", "text": "a"}]}])
        );
    }
}
