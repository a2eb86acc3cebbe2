//! Flattening of tag references into resolved tags
//!
//! Groups expand in place into their member tags. When the group reference carries its own
//! counts, they apply to the first tag the group emits and to nothing else. Chains hydrate with
//! the same rules.

use super::bit_config::{TagConfig, TagKind, TagsConfig};
use super::tables::{missing_key, ConfigTables, GroupType, TagRef, TagRefKind};
use crate::error::BitmarkError;
use crate::model::Count;
use tracing::trace;

/// Result of hydrating one tag list
#[derive(Debug, Clone, Default)]
pub struct HydratedTags {
    pub tags: TagsConfig,
    /// Set when a combo resource group was expanded into the list
    pub combo_resource_type: Option<String>,
}

pub struct Hydrator<'t> {
    tables: &'t ConfigTables,
}

impl<'t> Hydrator<'t> {
    pub fn new(tables: &'t ConfigTables) -> Self {
        Hydrator { tables }
    }

    pub fn hydrate(&self, refs: &[TagRef]) -> Result<HydratedTags, BitmarkError> {
        let mut hydrated = HydratedTags::default();
        self.hydrate_into(refs, &mut hydrated)?;
        Ok(hydrated)
    }

    fn hydrate_into(&self, refs: &[TagRef], out: &mut HydratedTags) -> Result<(), BitmarkError> {
        for tag_ref in refs {
            if tag_ref.kind == TagRefKind::Group {
                self.hydrate_group(tag_ref, out)?;
            } else {
                let tag = self.hydrate_tag(tag_ref)?;
                out.tags.insert(tag.config_key.clone(), tag);
            }
        }
        Ok(())
    }

    fn hydrate_group(&self, tag_ref: &TagRef, out: &mut HydratedTags) -> Result<(), BitmarkError> {
        let group = self
            .tables
            .groups
            .get(&tag_ref.key)
            .ok_or_else(|| missing_key("group", &tag_ref.key))?;
        trace!(group = %tag_ref.key, "expanding tag group");

        let mut members = HydratedTags::default();
        self.hydrate_into(&group.tags, &mut members)?;
        if let Some((_, first)) = members.tags.first_mut() {
            if let Some(max) = tag_ref.max_count {
                first.max_count = max;
            }
            if let Some(min) = tag_ref.min_count {
                first.min_count = min;
            }
        }
        if group.group_type == GroupType::ComboResource {
            out.combo_resource_type = group.combo_resource_type.clone();
        } else if members.combo_resource_type.is_some() {
            out.combo_resource_type = members.combo_resource_type;
        }
        out.tags.extend(members.tags);
        Ok(())
    }

    fn hydrate_tag(&self, tag_ref: &TagRef) -> Result<TagConfig, BitmarkError> {
        let (tag, kind, json_key, deprecated) = match tag_ref.kind {
            TagRefKind::Markup => {
                let entry = self
                    .tables
                    .tags
                    .get(&tag_ref.key)
                    .ok_or_else(|| missing_key("tag", &tag_ref.key))?;
                (&entry.tag, TagKind::Markup, None, &entry.deprecated)
            }
            TagRefKind::Property => {
                let entry = self
                    .tables
                    .properties
                    .get(&tag_ref.key)
                    .ok_or_else(|| missing_key("property", &tag_ref.key))?;
                let kind = TagKind::Property {
                    format: entry.format,
                    default_value: entry.default_value.clone(),
                };
                (&entry.tag, kind, entry.json_key.clone(), &entry.deprecated)
            }
            TagRefKind::Resource => {
                let entry = self
                    .tables
                    .resources
                    .get(&tag_ref.key)
                    .ok_or_else(|| missing_key("resource", &tag_ref.key))?;
                (
                    &entry.tag,
                    TagKind::Resource,
                    entry.json_key.clone(),
                    &entry.deprecated,
                )
            }
            TagRefKind::Group => unreachable!("groups are expanded by hydrate_group"),
        };

        let chain = match &tag_ref.chain {
            Some(chain) => Some(self.hydrate(chain)?.tags),
            None => None,
        };

        Ok(TagConfig {
            config_key: tag_ref.prefixed_key(),
            tag: tag.clone(),
            kind,
            min_count: tag_ref.min_count.unwrap_or(0),
            max_count: tag_ref.max_count.unwrap_or(Count::Finite(1)),
            chain,
            json_key,
            deprecated: deprecated.clone(),
        })
    }
}

/// Hydrates a tag list against `tables`
pub fn hydrate_tags(tables: &ConfigTables, refs: &[TagRef]) -> Result<HydratedTags, BitmarkError> {
    Hydrator::new(tables).hydrate(refs)
}
