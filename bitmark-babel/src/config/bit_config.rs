//! Resolved configuration records
//!
//! These are the immutable values handed out by the [`super::ConfigResolver`]. Every tag in a
//! [`TagsConfig`] is keyed by its prefixed table key (`title`, `@id`, `&image`), in declaration
//! order.

use super::tables::PropertyFormat;
use crate::model::{Count, TextFormat};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::{self, Write as _};

/// Resolved tags keyed by prefixed config key
pub type TagsConfig = IndexMap<String, TagConfig>;

/// What a resolved tag is
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TagKind {
    Markup,
    #[serde(rename_all = "camelCase")]
    Property {
        format: PropertyFormat,
        default_value: Option<String>,
    },
    Resource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagConfig {
    pub config_key: String,
    /// The tag as written in markup: `#` for a title, `id` for `[@id:...]`, `image` for `[&image:...]`
    pub tag: String,
    #[serde(flatten)]
    pub kind: TagKind,
    pub min_count: u32,
    pub max_count: Count,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<TagsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
}

impl TagConfig {
    pub fn is_resource(&self) -> bool {
        matches!(self.kind, TagKind::Resource)
    }

    pub fn is_property(&self) -> bool {
        matches!(self.kind, TagKind::Property { .. })
    }

    /// True when at least one occurrence is allowed
    pub fn is_allowed(&self) -> bool {
        self.max_count.allows_any()
    }

    fn label(&self) -> &'static str {
        match self.kind {
            TagKind::Markup => "TAG",
            TagKind::Property { .. } => "PTY",
            TagKind::Resource => "RES",
        }
    }

    /// Writes the tag and, when `include_chains` is set, its chain indented below it
    fn describe_into(&self, out: &mut String, indent: usize, include_chains: bool) {
        if !self.is_allowed() {
            return;
        }
        let pad = "  ".repeat(indent);
        let _ = writeln!(out, "{pad}{self}");
        if !include_chains {
            return;
        }
        if let Some(chain) = &self.chain {
            for tag in chain.values() {
                tag.describe_into(out, indent + 1, include_chains);
            }
        }
    }
}

impl fmt::Display for TagConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}, max={}, min={}]",
            self.label(),
            self.tag,
            self.max_count,
            self.min_count
        )?;
        if let TagKind::Property {
            format,
            default_value,
        } = &self.kind
        {
            write!(f, " format={format:?}")?;
            if let Some(value) = default_value {
                write!(f, " default={value}")?;
            }
        }
        if let Some(version) = &self.deprecated {
            write!(f, " deprecated={version}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardVariantConfig {
    pub tags: TagsConfig,
    pub body_allowed: bool,
    pub body_required: bool,
    pub repeat_count: Count,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardSideConfig {
    pub variants: Vec<CardVariantConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardSetConfig {
    pub key: String,
    pub sides: Vec<CardSideConfig>,
}

impl fmt::Display for CardSetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[CardSet: {}]", self.key)?;
        for (s, side) in self.sides.iter().enumerate() {
            for (v, variant) in side.variants.iter().enumerate() {
                writeln!(
                    f,
                    "side {s}, variant {v} (repeat={}, body={})",
                    variant.repeat_count, variant.body_allowed
                )?;
                for tag in variant.tags.values().filter(|t| t.is_allowed()) {
                    writeln!(f, "  {tag}")?;
                }
            }
        }
        Ok(())
    }
}

/// Fully merged configuration of one bit type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BitConfig {
    pub since: String,
    pub bit_type: String,
    /// Root first, ending with `bit_type`
    pub inherited_bit_types: Vec<String>,
    /// Same keys as `inherited_bit_types`, for ancestry checks
    #[serde(skip)]
    pub inherited_bit_type_set: HashSet<String>,
    pub aliases: Vec<String>,
    pub text_format_default: TextFormat,
    pub tags: TagsConfig,
    pub card_set: Option<CardSetConfig>,
    pub deprecated: Option<String>,
    pub quiz_bit: bool,
    pub body_allowed: bool,
    pub body_required: bool,
    pub footer_allowed: bool,
    pub footer_required: bool,
    pub resource_attachment_allowed: bool,
    pub root_example_type: Option<String>,
    pub combo_resource_type: Option<String>,
}

impl BitConfig {
    /// True when this bit is `bit` or inherits from it
    pub fn inherits_from(&self, bit: &str) -> bool {
        self.inherited_bit_type_set.contains(bit)
    }

    /// Human readable dump of the config. Chains are only listed when `include_chains` is set.
    pub fn describe(&self, include_chains: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "[Bit]");
        let _ = writeln!(out, "{} (since {})", self.bit_type, self.since);
        if let Some(version) = &self.deprecated {
            let _ = writeln!(out, "deprecated: {version}");
        }
        let _ = writeln!(out, "inherits: {}", self.inherited_bit_types.join(" > "));
        if !self.aliases.is_empty() {
            let _ = writeln!(out, "\n[Aliases]");
            for alias in &self.aliases {
                let _ = writeln!(out, "{alias}");
            }
        }
        let _ = writeln!(out, "\n[Flags]");
        let flags = [
            ("textFormatDefault", self.text_format_default.to_string()),
            ("quizBit", self.quiz_bit.to_string()),
            ("bodyAllowed", self.body_allowed.to_string()),
            ("bodyRequired", self.body_required.to_string()),
            ("footerAllowed", self.footer_allowed.to_string()),
            ("footerRequired", self.footer_required.to_string()),
            (
                "resourceAttachmentAllowed",
                self.resource_attachment_allowed.to_string(),
            ),
        ];
        for (name, value) in flags {
            let _ = writeln!(out, "{name}: {value}");
        }
        if let Some(combo) = &self.combo_resource_type {
            let _ = writeln!(out, "comboResourceType: {combo}");
        }
        if let Some(example) = &self.root_example_type {
            let _ = writeln!(out, "rootExampleType: {example}");
        }
        let _ = writeln!(out, "\n[Tags]");
        for tag in self.tags.values() {
            tag.describe_into(&mut out, 0, include_chains);
        }
        if let Some(card_set) = &self.card_set {
            let _ = write!(out, "\n{card_set}");
        }
        out
    }
}

impl fmt::Display for BitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(false))
    }
}
