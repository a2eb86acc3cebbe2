//! Text formats and text locations
//!
//! Both decide which reserved sequences need escaping. `latex`, `json` and `xml` are aliases of
//! plain `text`; `bitmark++` and `bitmark--` are the two flavours of bitmark text.

use crate::error::BitmarkError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Format of a piece of text inside a bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextFormat {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "latex")]
    Latex,
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "xml")]
    Xml,
    #[serde(rename = "bitmark--")]
    BitmarkMinusMinus,
    #[default]
    #[serde(rename = "bitmark++", alias = "bitmark+", alias = "bitmarkText")]
    BitmarkPlusPlus,
}

impl TextFormat {
    pub const ALL: [TextFormat; 6] = [
        TextFormat::Text,
        TextFormat::Latex,
        TextFormat::Json,
        TextFormat::Xml,
        TextFormat::BitmarkMinusMinus,
        TextFormat::BitmarkPlusPlus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TextFormat::Text => "text",
            TextFormat::Latex => "latex",
            TextFormat::Json => "json",
            TextFormat::Xml => "xml",
            TextFormat::BitmarkMinusMinus => "bitmark--",
            TextFormat::BitmarkPlusPlus => "bitmark++",
        }
    }

    /// True for every flavour of bitmark text (as opposed to plain text aliases)
    pub fn is_bitmark_text(&self) -> bool {
        matches!(
            self,
            TextFormat::BitmarkPlusPlus | TextFormat::BitmarkMinusMinus
        )
    }
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextFormat {
    type Err = BitmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(TextFormat::Text),
            "latex" => Ok(TextFormat::Latex),
            "json" => Ok(TextFormat::Json),
            "xml" => Ok(TextFormat::Xml),
            "bitmark--" => Ok(TextFormat::BitmarkMinusMinus),
            "bitmark++" | "bitmark+" | "bitmarkText" => Ok(TextFormat::BitmarkPlusPlus),
            other => Err(BitmarkError::ParseError(format!(
                "unknown text format '{other}'"
            ))),
        }
    }
}

/// Where a piece of text sits in the markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextLocation {
    #[default]
    Body,
    Tag,
}

impl TextLocation {
    pub const ALL: [TextLocation; 2] = [TextLocation::Body, TextLocation::Tag];

    pub fn as_str(&self) -> &'static str {
        match self {
            TextLocation::Body => "body",
            TextLocation::Tag => "tag",
        }
    }
}

impl fmt::Display for TextLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextLocation {
    type Err = BitmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "body" => Ok(TextLocation::Body),
            "tag" => Ok(TextLocation::Tag),
            other => Err(BitmarkError::ParseError(format!(
                "unknown text location '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases_of_bitmark_text() {
        assert_eq!("bitmark+".parse::<TextFormat>(), Ok(TextFormat::BitmarkPlusPlus));
        assert_eq!("bitmarkText".parse::<TextFormat>(), Ok(TextFormat::BitmarkPlusPlus));
        assert!("bitmark--".parse::<TextFormat>().unwrap().is_bitmark_text());
        assert!(!"latex".parse::<TextFormat>().unwrap().is_bitmark_text());
    }

    #[test]
    fn rejects_unknown_format() {
        assert!("rtf".parse::<TextFormat>().is_err());
        assert!("footer".parse::<TextLocation>().is_err());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&TextFormat::BitmarkPlusPlus).unwrap();
        assert_eq!(json, "\"bitmark++\"");
        let loc: TextLocation = serde_json::from_str("\"tag\"").unwrap();
        assert_eq!(loc, TextLocation::Tag);
    }
}
