//! Format registry for format discovery and selection
//!
//! Formats are registered and retrieved by name.

use crate::error::BitmarkError;
use crate::format::Format;
use crate::text::TextAst;
use std::collections::HashMap;

/// Registry of text AST formats
///
/// ```ignore
/// let registry = FormatRegistry::default();
/// let ast = registry.parse(source, "json")?;
/// let markup = registry.serialize(&ast, "bitmark")?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format, replacing any format with the same name
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    /// Get a format by name
    pub fn get(&self, name: &str) -> Result<&dyn Format, BitmarkError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| BitmarkError::FormatNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// Detect format from filename based on file extension
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?;

        self.formats
            .values()
            .find(|format| format.file_extensions().contains(&extension))
            .map(|format| format.name().to_string())
    }

    /// Parse source text using the specified format
    pub fn parse(&self, source: &str, format: &str) -> Result<TextAst, BitmarkError> {
        let fmt = self.get(format)?;
        if !fmt.supports_parsing() {
            return Err(BitmarkError::NotSupported(format!(
                "Format '{format}' does not support parsing"
            )));
        }
        fmt.parse(source)
    }

    /// Serialize a text AST using the specified format
    pub fn serialize(&self, ast: &TextAst, format: &str) -> Result<String, BitmarkError> {
        self.serialize_with_options(ast, format, &HashMap::new())
    }

    /// Serialize a text AST using the specified format and options
    pub fn serialize_with_options(
        &self,
        ast: &TextAst,
        format: &str,
        options: &HashMap<String, String>,
    ) -> Result<String, BitmarkError> {
        let fmt = self.get(format)?;
        if !fmt.supports_serialization() {
            return Err(BitmarkError::NotSupported(format!(
                "Format '{format}' does not support serialization"
            )));
        }
        fmt.serialize_with_options(ast, options)
    }

    /// Create a registry with the built-in formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(crate::formats::json::JsonFormat);
        registry.register(crate::formats::bitmark::BitmarkFormat::default());
        registry.register(crate::formats::text::PlainTextFormat);
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TextNode;

    struct TestFormat;

    impl Format for TestFormat {
        fn name(&self) -> &str {
            "test"
        }
        fn supports_parsing(&self) -> bool {
            true
        }
        fn supports_serialization(&self) -> bool {
            true
        }
        fn parse(&self, source: &str) -> Result<TextAst, BitmarkError> {
            Ok(vec![TextNode::paragraph(vec![TextNode::text(source)])])
        }
        fn serialize(&self, _ast: &TextAst) -> Result<String, BitmarkError> {
            Ok("test output".to_string())
        }
    }

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = FormatRegistry::new();
        registry.register(TestFormat);

        assert!(registry.has("test"));
        assert_eq!(registry.list_formats(), vec!["test"]);
        assert_eq!(registry.get("test").unwrap().name(), "test");
    }

    #[test]
    fn test_registry_replace_format() {
        let mut registry = FormatRegistry::new();
        registry.register(TestFormat);
        registry.register(TestFormat);

        assert_eq!(registry.list_formats().len(), 1);
    }

    #[test]
    fn test_registry_parse_not_found() {
        let registry = FormatRegistry::new();

        match registry.parse("input", "nonexistent").unwrap_err() {
            BitmarkError::FormatNotFound(name) => assert_eq!(name, "nonexistent"),
            other => panic!("Expected FormatNotFound error, got {other:?}"),
        }
    }

    #[test]
    fn test_registry_serialize() {
        let mut registry = FormatRegistry::new();
        registry.register(TestFormat);

        let ast = registry.parse("Hello", "test").unwrap();
        assert_eq!(registry.serialize(&ast, "test").unwrap(), "test output");
    }

    #[test]
    fn test_registry_rejects_unknown_options() {
        let mut registry = FormatRegistry::new();
        registry.register(TestFormat);

        let mut options = HashMap::new();
        options.insert("unused".to_string(), "true".to_string());

        let result = registry.serialize_with_options(&vec![], "test", &options);
        assert!(matches!(result, Err(BitmarkError::NotSupported(_))));
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = FormatRegistry::default();
        assert_eq!(registry.list_formats(), vec!["bitmark", "json", "text"]);
    }

    #[test]
    fn test_bitmark_cannot_be_parsed() {
        let registry = FormatRegistry::default();
        let result = registry.parse("[.article]", "bitmark");
        assert!(matches!(result, Err(BitmarkError::NotSupported(_))));
    }

    #[test]
    fn test_detect_format_from_filename() {
        let registry = FormatRegistry::with_defaults();

        assert_eq!(
            registry.detect_format_from_filename("doc.json"),
            Some("json".to_string())
        );
        assert_eq!(
            registry.detect_format_from_filename("/path/to/doc.bitmark"),
            Some("bitmark".to_string())
        );
        assert_eq!(
            registry.detect_format_from_filename("doc.txt"),
            Some("text".to_string())
        );
        assert_eq!(registry.detect_format_from_filename("doc.unknown"), None);
        assert_eq!(registry.detect_format_from_filename("doc"), None);
    }
}
