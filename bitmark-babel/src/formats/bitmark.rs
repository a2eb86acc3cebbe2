//! Bitmark format: text AST to bitmark text
//!
//! Serialization only. Parsing bitmark markup needs the full bit grammar, which lives outside
//! this crate.
//!
//! Options accepted by `serialize_with_options`:
//!
//! | Option               | Values                                       | Default     |
//! |----------------------|----------------------------------------------|-------------|
//! | `text_format`        | `bitmark++`, `bitmark--`, `text`, `latex`... | `bitmark++` |
//! | `text_location`      | `body`, `tag`                                | `body`      |
//! | `plain_text_divider` | `true`, `false`                              | `false`     |

use crate::error::BitmarkError;
use crate::format::Format;
use crate::model::{TextFormat, TextLocation};
use crate::text::{TextAst, TextGenerator, TextGeneratorOptions};
use std::collections::HashMap;

/// Format implementation for bitmark text
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmarkFormat {
    text_format: TextFormat,
    text_location: TextLocation,
    options: TextGeneratorOptions,
}

impl BitmarkFormat {
    pub fn new(
        text_format: TextFormat,
        text_location: TextLocation,
        options: TextGeneratorOptions,
    ) -> Self {
        Self {
            text_format,
            text_location,
            options,
        }
    }

    fn generate(&self, ast: &TextAst) -> String {
        TextGenerator::new(self.options)
            .generate_sync(ast, self.text_format, self.text_location)
            .into_string()
    }
}

impl Format for BitmarkFormat {
    fn name(&self) -> &str {
        "bitmark"
    }

    fn description(&self) -> &str {
        "Bitmark text (bitmark++ / bitmark--)"
    }

    fn file_extensions(&self) -> &[&str] {
        &["bitmark", "bm"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, ast: &TextAst) -> Result<String, BitmarkError> {
        Ok(self.generate(ast))
    }

    fn serialize_with_options(
        &self,
        ast: &TextAst,
        options: &HashMap<String, String>,
    ) -> Result<String, BitmarkError> {
        let mut format = *self;
        for (key, value) in options {
            match key.as_str() {
                "text_format" => format.text_format = value.parse()?,
                "text_location" => format.text_location = value.parse()?,
                "plain_text_divider" => {
                    format.options.plain_text_divider_allowed =
                        value.parse().map_err(|_| {
                            BitmarkError::ParseError(format!(
                                "plain_text_divider expects true or false, got '{value}'"
                            ))
                        })?
                }
                other => {
                    return Err(BitmarkError::NotSupported(format!(
                        "Format 'bitmark' has no option '{other}'"
                    )))
                }
            }
        }
        Ok(format.generate(ast))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TextNode;

    fn options(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn serializes_with_defaults() {
        let ast = vec![TextNode::paragraph(vec![TextNode::text("a**b")])];
        assert_eq!(BitmarkFormat::default().serialize(&ast).unwrap(), "a*^*b\n");
    }

    #[test]
    fn options_select_format_and_divider() {
        let ast = vec![TextNode::paragraph(vec![TextNode::text("plain")])];
        let out = BitmarkFormat::default()
            .serialize_with_options(&ast, &options(&[("plain_text_divider", "true")]))
            .unwrap();
        assert_eq!(out, "==== text ====\nplain\n");

        let out = BitmarkFormat::default()
            .serialize_with_options(&ast, &options(&[("text_format", "bitmark--")]))
            .unwrap();
        assert_eq!(out, "plain");
    }

    #[test]
    fn rejects_bad_options() {
        let ast = vec![];
        let format = BitmarkFormat::default();
        assert!(matches!(
            format.serialize_with_options(&ast, &options(&[("theme", "dark")])),
            Err(BitmarkError::NotSupported(_))
        ));
        assert!(matches!(
            format.serialize_with_options(&ast, &options(&[("text_location", "footer")])),
            Err(BitmarkError::ParseError(_))
        ));
    }
}
