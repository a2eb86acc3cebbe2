//! Unvalidated bit content, as produced by the markup parser

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a content item is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKey {
    TextFormat,
    ResourceType,
    Title,
    Anchor,
    Reference,
    ItemLead,
    Instruction,
    Hint,
    True,
    False,
    Gap,
    Mark,
    SampleSolution,
    Comment,
    Property,
    Resource,
    BodyText,
    CardSet,
    CardText,
    #[serde(other)]
    Unknown,
}

impl TypeKey {
    /// Type of the content item matching a markup tag config key
    pub fn from_config_key(key: &str) -> Option<TypeKey> {
        let type_key = match key {
            "title" => TypeKey::Title,
            "anchor" => TypeKey::Anchor,
            "reference" => TypeKey::Reference,
            "itemLead" => TypeKey::ItemLead,
            "instruction" => TypeKey::Instruction,
            "hint" => TypeKey::Hint,
            "true" => TypeKey::True,
            "false" => TypeKey::False,
            "gap" => TypeKey::Gap,
            "mark" => TypeKey::Mark,
            "sampleSolution" => TypeKey::SampleSolution,
            _ => return None,
        };
        Some(type_key)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKey::TextFormat => "textFormat",
            TypeKey::ResourceType => "resourceType",
            TypeKey::Title => "title",
            TypeKey::Anchor => "anchor",
            TypeKey::Reference => "reference",
            TypeKey::ItemLead => "itemLead",
            TypeKey::Instruction => "instruction",
            TypeKey::Hint => "hint",
            TypeKey::True => "true",
            TypeKey::False => "false",
            TypeKey::Gap => "gap",
            TypeKey::Mark => "mark",
            TypeKey::SampleSolution => "sampleSolution",
            TypeKey::Comment => "comment",
            TypeKey::Property => "property",
            TypeKey::Resource => "resource",
            TypeKey::BodyText => "bodyText",
            TypeKey::CardSet => "cardSet",
            TypeKey::CardText => "cardText",
            TypeKey::Unknown => "unknown",
        }
    }
}

/// Where the parser found an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserLocation {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSetContent {
    pub cards: Vec<CardContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardContent {
    pub sides: Vec<CardSideContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSideContent {
    pub variants: Vec<Vec<BitContent>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentValue {
    CardSet(CardSetContent),
    Text(String),
    Json(Value),
}

/// One item of bit content. Properties and resources carry their tag in `key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitContent {
    #[serde(rename = "type")]
    pub type_key: TypeKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ContentValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<Vec<BitContent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser: Option<ParserLocation>,
}

impl BitContent {
    pub fn new(type_key: TypeKey) -> Self {
        BitContent {
            type_key,
            key: None,
            value: None,
            chain: None,
            parser: None,
        }
    }

    pub fn property(key: &str, value: &str) -> Self {
        BitContent {
            key: Some(key.to_string()),
            ..BitContent::new(TypeKey::Property).with_text(value)
        }
    }

    pub fn resource(key: &str, url: &str) -> Self {
        BitContent {
            key: Some(key.to_string()),
            ..BitContent::new(TypeKey::Resource).with_text(url)
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.value = Some(ContentValue::Text(text.to_string()));
        self
    }

    pub fn with_chain(mut self, chain: Vec<BitContent>) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.parser = Some(ParserLocation { line, column });
        self
    }

    pub fn card_set(&self) -> Option<&CardSetContent> {
        match &self.value {
            Some(ContentValue::CardSet(card_set)) => Some(card_set),
            _ => None,
        }
    }
}
