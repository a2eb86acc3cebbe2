//! Static configuration tables
//!
//! The tables are declarative data: markup tags, properties, resources, reusable tag groups, card
//! sets and bits. They are decoded once from JSON and checked for referential integrity before
//! anything resolves against them. Tag references are discriminated by key prefix at load time
//! (`@` property, `&` resource, `group_` group, anything else a markup tag) so nothing downstream
//! looks at prefixes again.

use crate::error::BitmarkError;
use crate::model::{Count, TextFormat};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const BUILTIN_TABLES: &str = include_str!("../../data/tables.json");

/// Bit every bit type ultimately inherits from
pub const STANDARD_BIT: &str = "_standard";
/// Sentinel bit used for unknown bit type strings
pub const ERROR_BIT: &str = "_error";

/// Kind of a tag reference, resolved from its key prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagRefKind {
    Markup,
    Property,
    Resource,
    Group,
}

impl TagRefKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagRefKind::Markup => "tag",
            TagRefKind::Property => "property",
            TagRefKind::Resource => "resource",
            TagRefKind::Group => "group",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            TagRefKind::Markup => "",
            TagRefKind::Property => "@",
            TagRefKind::Resource => "&",
            TagRefKind::Group => "group_",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawTagRef {
    key: String,
    #[serde(default)]
    min_count: Option<u32>,
    #[serde(default)]
    max_count: Option<Count>,
    #[serde(default)]
    chain: Option<Vec<RawTagRef>>,
}

/// A reference from a bit, group or card variant to a table entry.
///
/// `min_count` and `max_count` are `None` when the reference does not set them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawTagRef")]
pub struct TagRef {
    pub kind: TagRefKind,
    pub key: String,
    pub min_count: Option<u32>,
    pub max_count: Option<Count>,
    pub chain: Option<Vec<TagRef>>,
}

impl TagRef {
    /// Builds a reference from a prefixed key such as `@id` or `group_standardTags`
    pub fn parse(prefixed: &str) -> Result<Self, String> {
        let (kind, key) = if let Some(rest) = prefixed.strip_prefix('@') {
            (TagRefKind::Property, rest)
        } else if let Some(rest) = prefixed.strip_prefix('&') {
            (TagRefKind::Resource, rest)
        } else if let Some(rest) = prefixed.strip_prefix("group_") {
            (TagRefKind::Group, rest)
        } else {
            (TagRefKind::Markup, prefixed)
        };
        if key.is_empty() {
            return Err(format!("empty tag reference '{prefixed}'"));
        }
        Ok(TagRef {
            kind,
            key: key.to_string(),
            min_count: None,
            max_count: None,
            chain: None,
        })
    }

    pub fn with_max_count(mut self, max_count: Count) -> Self {
        self.max_count = Some(max_count);
        self
    }

    /// The key as written in the tables, prefix included
    pub fn prefixed_key(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.key)
    }
}

impl TryFrom<RawTagRef> for TagRef {
    type Error = String;

    fn try_from(raw: RawTagRef) -> Result<Self, Self::Error> {
        let mut tag = TagRef::parse(&raw.key)?;
        tag.min_count = raw.min_count;
        tag.max_count = raw.max_count;
        tag.chain = raw
            .chain
            .map(|chain| chain.into_iter().map(TagRef::try_from).collect())
            .transpose()?;
        Ok(tag)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagEntry {
    pub tag: String,
    #[serde(default)]
    pub deprecated: Option<String>,
}

/// Value format of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyFormat {
    PlainText,
    RichText,
    Boolean,
    Number,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyEntry {
    pub tag: String,
    pub format: PropertyFormat,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub json_key: Option<String>,
    #[serde(default)]
    pub deprecated: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    pub tag: String,
    #[serde(default)]
    pub json_key: Option<String>,
    #[serde(default)]
    pub deprecated: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupType {
    Standard,
    Resource,
    ComboResource,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupEntry {
    #[serde(rename = "type")]
    pub group_type: GroupType,
    pub tags: Vec<TagRef>,
    #[serde(default)]
    pub combo_resource_type: Option<String>,
    #[serde(default)]
    pub deprecated: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardVariantEntry {
    #[serde(default)]
    pub tags: Vec<TagRef>,
    #[serde(default)]
    pub body_allowed: Option<bool>,
    #[serde(default)]
    pub body_required: bool,
    #[serde(default)]
    pub repeat_count: Option<Count>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardSetEntry {
    pub sides: Vec<Vec<CardVariantEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AliasEntry {
    #[serde(default)]
    pub since: Option<String>,
    #[serde(default)]
    pub deprecated: Option<String>,
}

/// One bit definition. Scalars left unset inherit from the base bit.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitEntry {
    pub since: String,
    #[serde(default)]
    pub base_bit_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<TagRef>,
    #[serde(default)]
    pub card_set: Option<String>,
    #[serde(default)]
    pub deprecated: Option<String>,
    #[serde(default)]
    pub quiz_bit: Option<bool>,
    #[serde(default)]
    pub body_allowed: Option<bool>,
    #[serde(default)]
    pub body_required: Option<bool>,
    #[serde(default)]
    pub footer_allowed: Option<bool>,
    #[serde(default)]
    pub footer_required: Option<bool>,
    #[serde(default)]
    pub resource_attachment_allowed: Option<bool>,
    #[serde(default)]
    pub root_example_type: Option<String>,
    #[serde(default)]
    pub text_format_default: Option<TextFormat>,
    #[serde(default)]
    pub combo_resource_type: Option<String>,
    #[serde(default)]
    pub aliases: IndexMap<String, AliasEntry>,
}

/// The complete, validated set of configuration tables
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigTables {
    pub tags: IndexMap<String, TagEntry>,
    pub properties: IndexMap<String, PropertyEntry>,
    pub resources: IndexMap<String, ResourceEntry>,
    pub groups: IndexMap<String, GroupEntry>,
    pub card_sets: IndexMap<String, CardSetEntry>,
    pub bits: IndexMap<String, BitEntry>,
    #[serde(skip)]
    alias_index: HashMap<String, String>,
}

static BUILTIN: OnceCell<Arc<ConfigTables>> = OnceCell::new();

impl ConfigTables {
    /// The tables embedded in the library, decoded on first use
    pub fn builtin() -> Result<Arc<ConfigTables>, BitmarkError> {
        BUILTIN
            .get_or_try_init(|| ConfigTables::from_json(BUILTIN_TABLES).map(Arc::new))
            .cloned()
    }

    /// Decode and validate tables from JSON
    pub fn from_json(source: &str) -> Result<ConfigTables, BitmarkError> {
        let mut tables: ConfigTables = serde_json::from_str(source)
            .map_err(|err| BitmarkError::InvalidTables(err.to_string()))?;
        tables.validate()?;
        tables.alias_index = tables
            .bits
            .iter()
            .flat_map(|(bit, entry)| {
                entry
                    .aliases
                    .keys()
                    .map(move |alias| (alias.clone(), bit.clone()))
            })
            .collect();
        Ok(tables)
    }

    /// Root bit key for a bit key or alias
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.bits.contains_key(name) {
            return Some(name);
        }
        self.alias_index.get(name).map(String::as_str)
    }

    pub fn alias_entry(&self, alias: &str) -> Option<&AliasEntry> {
        let root = self.alias_index.get(alias)?;
        self.bits.get(root)?.aliases.get(alias)
    }

    /// Bit keys walked from `bit` up to the root, leaf first
    pub fn ancestry(&self, bit: &str) -> Result<Vec<&str>, BitmarkError> {
        let mut chain = Vec::new();
        let mut current = Some(bit);
        while let Some(key) = current {
            if chain.iter().any(|seen| *seen == key) {
                return Err(BitmarkError::InvalidInheritance {
                    bit: bit.to_string(),
                    reason: format!("cycle through '{key}'"),
                });
            }
            let (key, entry) = self.bits.get_key_value(key).ok_or_else(|| {
                BitmarkError::InvalidInheritance {
                    bit: bit.to_string(),
                    reason: format!("unknown base bit type '{key}'"),
                }
            })?;
            chain.push(key.as_str());
            current = entry.base_bit_type.as_deref();
        }
        Ok(chain)
    }

    fn validate(&self) -> Result<(), BitmarkError> {
        for required in [STANDARD_BIT, ERROR_BIT] {
            if !self.bits.contains_key(required) {
                return Err(BitmarkError::InvalidTables(format!(
                    "missing required bit '{required}'"
                )));
            }
        }

        let mut aliases = HashSet::new();
        for (bit, entry) in &self.bits {
            self.ancestry(bit)?;
            self.check_refs(&entry.tags)?;
            if let Some(card_set) = &entry.card_set {
                if !self.card_sets.contains_key(card_set) {
                    return Err(missing_key("card set", card_set));
                }
            }
            for alias in entry.aliases.keys() {
                if self.bits.contains_key(alias) || !aliases.insert(alias.as_str()) {
                    return Err(BitmarkError::InvalidTables(format!(
                        "alias '{alias}' of bit '{bit}' is not unique"
                    )));
                }
            }
        }
        for group in self.groups.values() {
            self.check_refs(&group.tags)?;
        }
        for card_set in self.card_sets.values() {
            for variant in card_set.sides.iter().flatten() {
                self.check_refs(&variant.tags)?;
            }
        }
        for key in self.groups.keys() {
            self.check_group_cycle(key, &mut Vec::new())?;
        }
        Ok(())
    }

    fn check_refs(&self, refs: &[TagRef]) -> Result<(), BitmarkError> {
        for tag in refs {
            let exists = match tag.kind {
                TagRefKind::Markup => self.tags.contains_key(&tag.key),
                TagRefKind::Property => self.properties.contains_key(&tag.key),
                TagRefKind::Resource => self.resources.contains_key(&tag.key),
                TagRefKind::Group => self.groups.contains_key(&tag.key),
            };
            if !exists {
                return Err(missing_key(tag.kind.as_str(), &tag.key));
            }
            if let Some(chain) = &tag.chain {
                self.check_refs(chain)?;
            }
        }
        Ok(())
    }

    fn check_group_cycle<'a>(
        &'a self,
        key: &'a str,
        stack: &mut Vec<&'a str>,
    ) -> Result<(), BitmarkError> {
        if stack.contains(&key) {
            return Err(BitmarkError::InvalidTables(format!(
                "group '{key}' includes itself"
            )));
        }
        let Some(group) = self.groups.get(key) else {
            return Ok(());
        };
        stack.push(key);
        for tag in group.tags.iter().filter(|t| t.kind == TagRefKind::Group) {
            self.check_group_cycle(&tag.key, stack)?;
        }
        stack.pop();
        Ok(())
    }
}

pub(crate) fn missing_key(kind: &'static str, key: &str) -> BitmarkError {
    BitmarkError::ConfigKeyNotFound {
        kind,
        key: key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(extra_bits: &str) -> String {
        format!(
            r##"{{
                "tags": {{ "title": {{ "tag": "#" }} }},
                "properties": {{}},
                "resources": {{}},
                "groups": {{}},
                "cardSets": {{}},
                "bits": {{
                    "_standard": {{ "since": "1.0.0" }},
                    "_error": {{ "since": "1.0.0" }}
                    {extra_bits}
                }}
            }}"##
        )
    }

    #[test]
    fn builtin_tables_load() {
        let tables = ConfigTables::builtin().unwrap();
        assert!(tables.bits.contains_key("recipe"));
        assert_eq!(tables.resolve_alias("page"), Some("article"));
        assert_eq!(tables.resolve_alias("nope"), None);
    }

    #[test]
    fn tag_refs_are_discriminated_by_prefix() {
        assert_eq!(TagRef::parse("@id").unwrap().kind, TagRefKind::Property);
        assert_eq!(TagRef::parse("&image").unwrap().kind, TagRefKind::Resource);
        let group = TagRef::parse("group_standardTags").unwrap();
        assert_eq!(group.kind, TagRefKind::Group);
        assert_eq!(group.key, "standardTags");
        assert_eq!(group.prefixed_key(), "group_standardTags");
        assert_eq!(TagRef::parse("title").unwrap().kind, TagRefKind::Markup);
        assert!(TagRef::parse("@").is_err());
    }

    #[test]
    fn rejects_unknown_tag_reference() {
        let source = minimal(r#", "broken": { "since": "1.0.0", "tags": [{ "key": "@missing" }] }"#);
        let err = ConfigTables::from_json(&source).unwrap_err();
        assert_eq!(
            err,
            BitmarkError::ConfigKeyNotFound {
                kind: "property",
                key: "missing".to_string()
            }
        );
    }

    #[test]
    fn rejects_inheritance_cycle() {
        let source = minimal(
            r#", "a": { "since": "1.0.0", "baseBitType": "b" },
                 "b": { "since": "1.0.0", "baseBitType": "a" }"#,
        );
        let err = ConfigTables::from_json(&source).unwrap_err();
        assert!(matches!(err, BitmarkError::InvalidInheritance { .. }));
    }

    #[test]
    fn rejects_missing_sentinel_bits() {
        let source = r#"{ "tags": {}, "properties": {}, "resources": {}, "groups": {},
                          "cardSets": {}, "bits": { "_standard": { "since": "1.0.0" } } }"#;
        let err = ConfigTables::from_json(source).unwrap_err();
        assert!(matches!(err, BitmarkError::InvalidTables(_)));
    }

    #[test]
    fn ancestry_is_leaf_first() {
        let tables = ConfigTables::builtin().unwrap();
        assert_eq!(
            tables.ancestry("recipe").unwrap(),
            vec!["recipe", "cookIngredients", "_standard"]
        );
    }
}
