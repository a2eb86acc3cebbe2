//! Format trait definition
//!
//! A format converts between a string representation and the text AST. Formats can support
//! parsing, serialization, or both.

use crate::error::BitmarkError;
use crate::text::TextAst;
use std::collections::HashMap;

/// Trait for text AST formats
///
/// # Examples
///
/// ```ignore
/// struct Upper;
///
/// impl Format for Upper {
///     fn name(&self) -> &str {
///         "upper"
///     }
///
///     fn supports_serialization(&self) -> bool {
///         true
///     }
///
///     fn serialize(&self, ast: &TextAst) -> Result<String, BitmarkError> {
///         Ok(plain_text(ast).to_uppercase())
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "json", "bitmark")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this format, without the leading dot
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Whether this format supports parsing (source → TextAst)
    fn supports_parsing(&self) -> bool {
        false
    }

    /// Whether this format supports serialization (TextAst → source)
    fn supports_serialization(&self) -> bool {
        false
    }

    /// Parse source text into a text AST
    fn parse(&self, _source: &str) -> Result<TextAst, BitmarkError> {
        Err(BitmarkError::NotSupported(format!(
            "Format '{}' does not support parsing",
            self.name()
        )))
    }

    /// Serialize a text AST into source text
    fn serialize(&self, _ast: &TextAst) -> Result<String, BitmarkError> {
        Err(BitmarkError::NotSupported(format!(
            "Format '{}' does not support serialization",
            self.name()
        )))
    }

    /// Serialize a text AST, optionally using extra parameters.
    ///
    /// Formats without parameters rely on the default, which rejects any option.
    fn serialize_with_options(
        &self,
        ast: &TextAst,
        options: &HashMap<String, String>,
    ) -> Result<String, BitmarkError> {
        if options.is_empty() {
            self.serialize(ast)
        } else {
            Err(BitmarkError::NotSupported(format!(
                "Format '{}' does not support extra parameters",
                self.name()
            )))
        }
    }
}
