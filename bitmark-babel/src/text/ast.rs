//! The text AST: the JSON form of bitmark body text

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A document or fragment of body text
pub type TextAst = Vec<TextNode>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextNodeType {
    Text,
    HardBreak,
    Paragraph,
    Heading,
    Section,
    BulletList,
    NoBulletList,
    OrderedList,
    OrderedListRoman,
    OrderedListRomanLower,
    LetteredList,
    LetteredListLower,
    TaskList,
    ListItem,
    TaskItem,
    Image,
    ImageInline,
    CodeBlock,
    Latex,
    Gap,
    Select,
    Highlight,
    Mark,
    #[serde(other)]
    Unknown,
}

impl TextNodeType {
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            TextNodeType::BulletList
                | TextNodeType::NoBulletList
                | TextNodeType::OrderedList
                | TextNodeType::OrderedListRoman
                | TextNodeType::OrderedListRomanLower
                | TextNodeType::LetteredList
                | TextNodeType::LetteredListLower
                | TextNodeType::TaskList
        )
    }

    /// Interactive nodes rendered as placeholders
    pub fn is_body_bit(&self) -> bool {
        matches!(
            self,
            TextNodeType::Gap | TextNodeType::Select | TextNodeType::Highlight | TextNodeType::Mark
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextMarkType {
    Bold,
    Light,
    Italic,
    Highlight,
    Strike,
    Subscript,
    Superscript,
    Ins,
    Del,
    Underline,
    DoubleUnderline,
    Circle,
    LanguageEm,
    UserUnderline,
    UserDoubleUnderline,
    UserStrike,
    UserCircle,
    UserHighlight,
    Var,
    Code,
    Timer,
    Duration,
    Color,
    Comment,
    Link,
    #[serde(other)]
    Unknown,
}

impl TextMarkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextMarkType::Bold => "bold",
            TextMarkType::Light => "light",
            TextMarkType::Italic => "italic",
            TextMarkType::Highlight => "highlight",
            TextMarkType::Strike => "strike",
            TextMarkType::Subscript => "subscript",
            TextMarkType::Superscript => "superscript",
            TextMarkType::Ins => "ins",
            TextMarkType::Del => "del",
            TextMarkType::Underline => "underline",
            TextMarkType::DoubleUnderline => "doubleUnderline",
            TextMarkType::Circle => "circle",
            TextMarkType::LanguageEm => "languageEm",
            TextMarkType::UserUnderline => "userUnderline",
            TextMarkType::UserDoubleUnderline => "userDoubleUnderline",
            TextMarkType::UserStrike => "userStrike",
            TextMarkType::UserCircle => "userCircle",
            TextMarkType::UserHighlight => "userHighlight",
            TextMarkType::Var => "var",
            TextMarkType::Code => "code",
            TextMarkType::Timer => "timer",
            TextMarkType::Duration => "duration",
            TextMarkType::Color => "color",
            TextMarkType::Comment => "comment",
            TextMarkType::Link => "link",
            TextMarkType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMark {
    #[serde(rename = "type")]
    pub mark_type: TextMarkType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TextMark {
    pub fn new(mark_type: TextMarkType) -> Self {
        TextMark {
            mark_type,
            attrs: None,
            extra: Map::new(),
        }
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attrs
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// String attribute, looked up in `attrs` first and then on the mark itself
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        lookup(self.attrs.as_ref(), &self.extra, key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    #[serde(rename = "type")]
    pub node_type: TextNodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<TextMark>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<TextNode>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TextNode {
    pub fn new(node_type: TextNodeType) -> Self {
        TextNode {
            node_type,
            text: None,
            marks: None,
            attrs: None,
            content: None,
            extra: Map::new(),
        }
    }

    pub fn text(text: &str) -> Self {
        TextNode {
            text: Some(text.to_string()),
            ..TextNode::new(TextNodeType::Text)
        }
    }

    pub fn paragraph(content: Vec<TextNode>) -> Self {
        TextNode::new(TextNodeType::Paragraph).with_content(content)
    }

    pub fn hard_break() -> Self {
        TextNode::new(TextNodeType::HardBreak)
    }

    pub fn with_content(mut self, content: Vec<TextNode>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_marks(mut self, marks: Vec<TextMark>) -> Self {
        self.marks = Some(marks);
        self
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attrs
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        lookup(self.attrs.as_ref(), &self.extra, key)
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(Value::as_str)
    }

    pub fn attr_u64(&self, key: &str) -> Option<u64> {
        match self.attr(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn attr_bool(&self, key: &str) -> bool {
        self.attr(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn children(&self) -> &[TextNode] {
        self.content.as_deref().unwrap_or_default()
    }
}

fn lookup<'a>(attrs: Option<&'a Map<String, Value>>, extra: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    attrs
        .and_then(|attrs| attrs.get(key))
        .or_else(|| extra.get(key))
        .filter(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_node_and_mark_types_decode() {
        let ast: TextAst = serde_json::from_str(
            r#"[{ "type": "paragraph", "content": [
                { "type": "text", "text": "hi", "marks": [{ "type": "sparkle" }] },
                { "type": "mystery" }
            ] }]"#,
        )
        .unwrap();
        let children = ast[0].children();
        assert_eq!(children[0].marks.as_ref().unwrap()[0].mark_type, TextMarkType::Unknown);
        assert_eq!(children[1].node_type, TextNodeType::Unknown);
    }

    #[test]
    fn attributes_fall_back_to_node_fields() {
        let node: TextNode =
            serde_json::from_str(r#"{ "type": "section", "section": "footer", "attrs": { "level": "2" } }"#)
                .unwrap();
        assert_eq!(node.attr_str("section"), Some("footer"));
        assert_eq!(node.attr_u64("level"), Some(2));
        assert_eq!(node.attr_u64("missing"), None);
    }
}
