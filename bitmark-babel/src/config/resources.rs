//! Resource tags of a bit, adjusted for the resource type attached in the bit header
//!
//! A header such as `[.image&image]` selects one resource: that resource becomes required
//! exactly once. For a combo resource such as `still-image-film`, each member resource of the
//! combo takes its count from the combo group instead.

use super::bit_config::TagsConfig;
use super::resolver::{BitType, ConfigResolver};
use crate::error::BitmarkError;
use crate::model::Count;
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesConfig {
    pub tags: TagsConfig,
    pub resource_attachment_allowed: bool,
    pub resource_type_attachment: Option<String>,
    /// Combo resource type to the tags of its member resources
    pub combo_resources: IndexMap<String, Vec<String>>,
}

impl ConfigResolver {
    /// Resource tags of `bit_type`. Not cached: the result depends on `attachment`.
    pub fn get_bit_resources_config(
        &self,
        bit_type: &BitType,
        attachment: Option<&str>,
    ) -> Result<ResourcesConfig, BitmarkError> {
        let bit = self.get_bit_config(bit_type)?;

        let mut tags: TagsConfig = bit
            .tags
            .iter()
            .filter(|(_, tag)| tag.is_resource())
            .map(|(key, tag)| (key.clone(), tag.clone()))
            .collect();

        let combo_key = bit.combo_resource_type.clone().or_else(|| {
            attachment
                .filter(|_| bit.resource_attachment_allowed)
                .map(str::to_string)
        });
        let combo = match &combo_key {
            Some(key) => self.combo_resource(key)?,
            None => None,
        };

        let mut combo_resources = IndexMap::new();
        if let (Some(key), Some(members)) = (&combo_key, &combo) {
            combo_resources.insert(
                key.clone(),
                members.values().map(|tag| tag.tag.clone()).collect(),
            );
        }

        if let Some(attachment) = attachment {
            let combo_selected = combo.is_some() && combo_key.as_deref() == Some(attachment);
            for tag in tags.values_mut() {
                if tag.tag == attachment {
                    tag.min_count = 1;
                    tag.max_count = Count::Finite(1);
                } else if combo_selected {
                    let member = combo
                        .as_ref()
                        .and_then(|members| members.values().find(|m| m.tag == tag.tag));
                    if let Some(member) = member {
                        tag.min_count = member.min_count;
                        tag.max_count = member.max_count;
                    }
                }
            }
        }

        Ok(ResourcesConfig {
            tags,
            resource_attachment_allowed: bit.resource_attachment_allowed,
            resource_type_attachment: attachment.map(str::to_string),
            combo_resources,
        })
    }
}
