//! The bit configuration service
//!
//! A [`ConfigResolver`] owns a set of [`ConfigTables`] and lazily materialises the merged
//! [`BitConfig`] of each bit type the first time it is asked for. Results are immutable and
//! shared behind `Arc`; the caches are never invalidated. Construct one resolver per set of
//! tables (tests build their own), or use [`ConfigResolver::global`] for the embedded tables.

use super::bit_config::{
    BitConfig, CardSetConfig, CardSideConfig, CardVariantConfig, TagsConfig,
};
use super::hydrator::hydrate_tags;
use super::tables::{ConfigTables, GroupType, TagRef, ERROR_BIT};
use crate::error::BitmarkError;
use crate::model::{Count, TextFormat};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const INTERNAL_COMMENT: &str = "@internalComment";

/// A canonical bit type: the name used in markup and the bit it resolves to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitType {
    pub alias: String,
    pub root: String,
}

impl BitType {
    pub fn is_error(&self) -> bool {
        self.root == ERROR_BIT
    }
}

impl fmt::Display for BitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.alias)
    }
}

pub struct ConfigResolver {
    tables: Arc<ConfigTables>,
    bit_configs: RwLock<HashMap<String, Arc<BitConfig>>>,
    combo_resources: RwLock<HashMap<String, Option<Arc<TagsConfig>>>>,
    resource_shadows: OnceCell<TagsConfig>,
}

static GLOBAL: OnceCell<ConfigResolver> = OnceCell::new();

impl ConfigResolver {
    pub fn new(tables: Arc<ConfigTables>) -> Self {
        ConfigResolver {
            tables,
            bit_configs: RwLock::new(HashMap::new()),
            combo_resources: RwLock::new(HashMap::new()),
            resource_shadows: OnceCell::new(),
        }
    }

    /// A fresh resolver over the embedded tables
    pub fn builtin() -> Result<Self, BitmarkError> {
        Ok(ConfigResolver::new(ConfigTables::builtin()?))
    }

    /// Process-wide resolver over the embedded tables
    pub fn global() -> Result<&'static ConfigResolver, BitmarkError> {
        GLOBAL.get_or_try_init(ConfigResolver::builtin)
    }

    pub fn tables(&self) -> &ConfigTables {
        &self.tables
    }

    /// Canonicalises a bit type string from markup.
    ///
    /// A leading `|` (commented bit) is ignored and aliases resolve to their bit. Unknown names
    /// resolve to the `_error` bit.
    pub fn get_bit_type(&self, raw: &str) -> BitType {
        let name = raw.strip_prefix('|').unwrap_or(raw).trim();
        match self.tables.resolve_alias(name) {
            Some(root) => BitType {
                alias: name.to_string(),
                root: root.to_string(),
            },
            None => BitType {
                alias: ERROR_BIT.to_string(),
                root: ERROR_BIT.to_string(),
            },
        }
    }

    pub fn is_bit_type_commented(raw: &str) -> bool {
        raw.starts_with('|')
    }

    /// Names of every bit type and alias, in table order
    pub fn bit_type_names(&self) -> Vec<&str> {
        self.tables
            .bits
            .iter()
            .flat_map(|(key, entry)| {
                std::iter::once(key.as_str()).chain(entry.aliases.keys().map(String::as_str))
            })
            .collect()
    }

    pub fn get_bit_config(&self, bit_type: &BitType) -> Result<Arc<BitConfig>, BitmarkError> {
        if let Some(config) = self.bit_configs.read().get(&bit_type.alias) {
            return Ok(Arc::clone(config));
        }

        let config = Arc::new(self.build_bit_config(bit_type)?);
        debug!(
            bit = %bit_type.alias,
            root = %bit_type.root,
            tags = config.tags.len(),
            "resolved bit config"
        );
        let mut cache = self.bit_configs.write();
        let cached = cache
            .entry(bit_type.alias.clone())
            .or_insert_with(|| Arc::clone(&config));
        Ok(Arc::clone(cached))
    }

    /// True when `bit_type` is, or inherits from, any of `bases` (bit keys or aliases)
    pub fn is_of_bit_type(&self, bit_type: &BitType, bases: &[&str]) -> bool {
        let Ok(config) = self.get_bit_config(bit_type) else {
            return false;
        };
        bases.iter().any(|&base| {
            let base = self.tables.resolve_alias(base).unwrap_or(base);
            config.inherits_from(base)
        })
    }

    fn build_bit_config(&self, bit_type: &BitType) -> Result<BitConfig, BitmarkError> {
        let not_found = || BitmarkError::BitConfigNotFound {
            alias: bit_type.alias.clone(),
            root: bit_type.root.clone(),
        };
        let root_entry = self.tables.bits.get(&bit_type.root).ok_or_else(not_found)?;

        let mut chain = self.tables.ancestry(&bit_type.root)?;
        chain.reverse();

        let mut refs: Vec<TagRef> = Vec::new();
        let mut card_set = None;
        let mut quiz_bit = None;
        let mut body_allowed = None;
        let mut body_required = None;
        let mut footer_allowed = None;
        let mut footer_required = None;
        let mut resource_attachment_allowed = None;
        let mut root_example_type = None;
        let mut text_format_default = None;
        let mut combo_resource_type = None;

        for key in &chain {
            let entry = &self.tables.bits[*key];
            refs.extend(entry.tags.iter().cloned());
            card_set = entry.card_set.clone().or(card_set);
            quiz_bit = entry.quiz_bit.or(quiz_bit);
            body_allowed = entry.body_allowed.or(body_allowed);
            body_required = entry.body_required.or(body_required);
            footer_allowed = entry.footer_allowed.or(footer_allowed);
            footer_required = entry.footer_required.or(footer_required);
            resource_attachment_allowed = entry
                .resource_attachment_allowed
                .or(resource_attachment_allowed);
            root_example_type = entry.root_example_type.clone().or(root_example_type);
            text_format_default = entry.text_format_default.or(text_format_default);
            combo_resource_type = entry.combo_resource_type.clone().or(combo_resource_type);
        }

        refs.push(
            TagRef::parse(INTERNAL_COMMENT)
                .map_err(BitmarkError::InvalidTables)?
                .with_max_count(Count::Infinity),
        );

        let hydrated = hydrate_tags(&self.tables, &refs)?;
        let mut tags = hydrated.tags;
        for (key, shadow) in self.resource_shadows()? {
            tags.entry(key.clone()).or_insert_with(|| shadow.clone());
        }

        let card_set = card_set
            .map(|key| self.build_card_set(&key))
            .transpose()?;

        let (since, deprecated) = match self.tables.alias_entry(&bit_type.alias) {
            Some(alias) => (
                alias.since.clone().unwrap_or_else(|| root_entry.since.clone()),
                alias.deprecated.clone().or_else(|| root_entry.deprecated.clone()),
            ),
            None => (root_entry.since.clone(), root_entry.deprecated.clone()),
        };

        Ok(BitConfig {
            since,
            bit_type: bit_type.root.clone(),
            inherited_bit_types: chain.iter().map(|key| key.to_string()).collect(),
            inherited_bit_type_set: chain.iter().map(|key| key.to_string()).collect(),
            aliases: root_entry.aliases.keys().cloned().collect(),
            text_format_default: text_format_default.unwrap_or(TextFormat::BitmarkPlusPlus),
            tags,
            card_set,
            deprecated,
            quiz_bit: quiz_bit.unwrap_or(false),
            body_allowed: body_allowed.unwrap_or(false),
            body_required: body_required.unwrap_or(false),
            footer_allowed: footer_allowed.unwrap_or(false),
            footer_required: footer_required.unwrap_or(false),
            resource_attachment_allowed: resource_attachment_allowed.unwrap_or(false),
            root_example_type,
            combo_resource_type: combo_resource_type.or(hydrated.combo_resource_type),
        })
    }

    fn build_card_set(&self, key: &str) -> Result<CardSetConfig, BitmarkError> {
        let entry = self
            .tables
            .card_sets
            .get(key)
            .ok_or_else(|| super::tables::missing_key("card set", key))?;
        let sides = entry
            .sides
            .iter()
            .map(|variants| {
                let variants = variants
                    .iter()
                    .map(|variant| {
                        Ok(CardVariantConfig {
                            tags: hydrate_tags(&self.tables, &variant.tags)?.tags,
                            body_allowed: variant.body_allowed.unwrap_or(true),
                            body_required: variant.body_required,
                            repeat_count: variant.repeat_count.unwrap_or_default(),
                        })
                    })
                    .collect::<Result<Vec<_>, BitmarkError>>()?;
                Ok(CardSideConfig { variants })
            })
            .collect::<Result<Vec<_>, BitmarkError>>()?;
        Ok(CardSetConfig {
            key: key.to_string(),
            sides,
        })
    }

    /// Every resource tag known to the tables with a count of 0..0
    fn resource_shadows(&self) -> Result<&TagsConfig, BitmarkError> {
        self.resource_shadows.get_or_try_init(|| {
            let mut shadows = TagsConfig::new();
            for group in self
                .tables
                .groups
                .values()
                .filter(|g| g.group_type == GroupType::Resource)
            {
                for (key, mut tag) in hydrate_tags(&self.tables, &group.tags)?.tags {
                    if tag.is_resource() {
                        tag.min_count = 0;
                        tag.max_count = Count::Finite(0);
                        shadows.entry(key).or_insert(tag);
                    }
                }
            }
            Ok(shadows)
        })
    }

    /// Resource members of the combo resource group for `combo_type`
    pub(crate) fn combo_resource(
        &self,
        combo_type: &str,
    ) -> Result<Option<Arc<TagsConfig>>, BitmarkError> {
        if let Some(cached) = self.combo_resources.read().get(combo_type) {
            return Ok(cached.clone());
        }

        let group = self.tables.groups.values().find(|g| {
            g.group_type == GroupType::ComboResource
                && g.combo_resource_type.as_deref() == Some(combo_type)
        });
        let members = match group {
            Some(group) => {
                let mut tags = hydrate_tags(&self.tables, &group.tags)?.tags;
                tags.retain(|_, tag| tag.is_resource());
                Some(Arc::new(tags))
            }
            None => None,
        };
        self.combo_resources
            .write()
            .entry(combo_type.to_string())
            .or_insert_with(|| members.clone());
        Ok(members)
    }
}
