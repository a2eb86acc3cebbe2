//! Validation of parsed bit content against the bit's configuration
//!
//! The parser hands over a flat list of tags for the bit header, each possibly carrying a chain
//! of tags that modify it, plus an optional card set. Validation walks that list once per level
//! (bit, card variant, chain) and decides for every item whether it is kept, kept with a
//! warning, unchained, or dropped. User mistakes never produce an `Err`; they end up as
//! warnings on the [`ValidationContext`].
//!
//! Rules per item:
//!
//!     - known tag, within its max count       -> kept
//!     - known tag, over its max count         -> kept (last one wins), warning
//!     - unknown property                      -> kept, warning
//!     - unknown resource                      -> kept, warning
//!     - anything else unknown                 -> dropped, warning
//!     - chain where the tag expects none      -> chain items unchained into the parent list
//!     - chain where the tag expects one       -> chain validated recursively
//!
//! Tags with a max count of 0 (such as the shadow resources every bit carries) count as unknown.

pub mod content;
pub mod context;
mod mistakes;

pub use content::{BitContent, CardSetContent, ContentValue, ParserLocation, TypeKey};
pub use context::{ValidationContext, ValidationWarning, WarningKind};
pub use mistakes::find_common_mistakes;

use crate::config::{BitConfig, BitType, CardVariantConfig, ConfigResolver, TagConfig, TagKind, TagsConfig};
use crate::error::BitmarkError;
use crate::model::Count;
use std::collections::{HashMap, VecDeque};

/// Nesting level of the content being validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentLevel {
    Bit,
    Card,
    Chain,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SlotKey {
    Type(TypeKey),
    Property(String),
    Resource(String),
}

impl SlotKey {
    fn of(item: &BitContent) -> SlotKey {
        match (item.type_key, &item.key) {
            (TypeKey::Property, Some(key)) => SlotKey::Property(key.clone()),
            (TypeKey::Resource, Some(key)) => SlotKey::Resource(key.clone()),
            (type_key, _) => SlotKey::Type(type_key),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot<'c> {
    max_count: Count,
    chain: Option<&'c TagsConfig>,
}

/// Allowed items at one level, keyed the way content items are
#[derive(Debug, Default)]
struct Slots<'c> {
    slots: HashMap<SlotKey, Slot<'c>>,
}

impl<'c> Slots<'c> {
    fn with_tags(level: ContentLevel, tags: impl IntoIterator<Item = &'c TagConfig>) -> Self {
        let mut slots = Slots::default();
        slots.add_tags(tags);
        slots.allow(TypeKey::Comment, Count::Infinity);
        match level {
            ContentLevel::Bit => {
                slots.allow(TypeKey::TextFormat, Count::Finite(1));
                slots.allow(TypeKey::ResourceType, Count::Finite(1));
                slots.allow(TypeKey::BodyText, Count::Infinity);
            }
            ContentLevel::Card => slots.allow(TypeKey::CardText, Count::Infinity),
            ContentLevel::Chain => {}
        }
        slots
    }

    fn add_tags(&mut self, tags: impl IntoIterator<Item = &'c TagConfig>) {
        for tag in tags.into_iter().filter(|t| t.is_allowed()) {
            let key = match &tag.kind {
                TagKind::Markup => match TypeKey::from_config_key(&tag.config_key) {
                    Some(type_key) => SlotKey::Type(type_key),
                    None => continue,
                },
                TagKind::Property { .. } => SlotKey::Property(tag.tag.clone()),
                TagKind::Resource => SlotKey::Resource(tag.tag.clone()),
            };
            self.slots.insert(
                key,
                Slot {
                    max_count: tag.max_count,
                    chain: tag.chain.as_ref(),
                },
            );
        }
    }

    fn allow(&mut self, type_key: TypeKey, max_count: Count) {
        self.slots.insert(
            SlotKey::Type(type_key),
            Slot {
                max_count,
                chain: None,
            },
        );
    }

    fn get(&self, key: &SlotKey) -> Option<Slot<'c>> {
        self.slots.get(key).copied()
    }
}

#[derive(Debug, Default)]
struct Seen {
    count: u32,
    last: Option<ParserLocation>,
}

fn describe(item: &BitContent) -> String {
    match (item.type_key, &item.key) {
        (TypeKey::Property | TypeKey::Resource, Some(key)) => {
            format!("'{}' with key '{key}'", item.type_key.as_str())
        }
        _ => format!("'{}'", item.type_key.as_str()),
    }
}

/// Validates bit content for one resolver
pub struct TagValidator<'r> {
    resolver: &'r ConfigResolver,
    check_common_mistakes: bool,
}

impl<'r> TagValidator<'r> {
    pub fn new(resolver: &'r ConfigResolver) -> Self {
        TagValidator {
            resolver,
            check_common_mistakes: true,
        }
    }

    pub fn with_common_mistakes(mut self, enabled: bool) -> Self {
        self.check_common_mistakes = enabled;
        self
    }

    /// Validates the header tags of a bit, descending into chains and the card set.
    ///
    /// `resource_type` is the resource attached in the bit header, if any.
    pub fn validate_bit_tags(
        &self,
        ctx: &mut ValidationContext,
        bit_type: &BitType,
        resource_type: Option<&str>,
        content: Vec<BitContent>,
    ) -> Result<Vec<BitContent>, BitmarkError> {
        let bit = self.resolver.get_bit_config(bit_type)?;
        let resources = self
            .resolver
            .get_bit_resources_config(bit_type, resource_type)?;

        let header_tags = bit.tags.values().filter(|t| !t.is_resource());
        let mut slots = Slots::with_tags(ContentLevel::Bit, header_tags);
        slots.add_tags(resources.tags.values());
        if bit.card_set.is_some() {
            slots.allow(TypeKey::CardSet, Count::Finite(1));
        }

        Ok(self.validate_level(ctx, bit_type, &bit, &slots, content))
    }

    fn validate_level(
        &self,
        ctx: &mut ValidationContext,
        bit_type: &BitType,
        bit: &BitConfig,
        slots: &Slots<'_>,
        content: Vec<BitContent>,
    ) -> Vec<BitContent> {
        let mut queue: VecDeque<BitContent> = content.into();
        let mut seen: HashMap<SlotKey, Seen> = HashMap::new();
        let mut validated = Vec::with_capacity(queue.len());

        while let Some(mut item) = queue.pop_front() {
            let key = SlotKey::of(&item);
            let Some(slot) = slots.get(&key) else {
                if self.keep_unknown(ctx, bit_type, &item) {
                    let chain = item.chain.take();
                    validated.push(item);
                    for unchained in chain.into_iter().flatten().rev() {
                        queue.push_front(unchained);
                    }
                }
                continue;
            };

            let entry = seen.entry(key).or_default();
            entry.count += 1;
            if let Count::Finite(max) = slot.max_count {
                if slot.max_count.exceeded_by(entry.count) {
                    ctx.add_warning(
                        WarningKind::TooMany { max },
                        format!(
                            "{} is included more than {max} time(s). The earlier ones will be ignored",
                            describe(&item)
                        ),
                        item.parser,
                        entry.last,
                    );
                }
            }
            entry.last = item.parser;

            if item.type_key == TypeKey::CardSet {
                self.validate_card_set(ctx, bit_type, bit, &mut item);
            }

            if let Some(chain) = item.chain.take() {
                match slot.chain {
                    Some(chain_tags) => {
                        let chain_slots = Slots::with_tags(ContentLevel::Chain, chain_tags.values());
                        let chain = self.validate_level(ctx, bit_type, bit, &chain_slots, chain);
                        if !chain.is_empty() {
                            item.chain = Some(chain);
                        }
                        validated.push(item);
                    }
                    None => {
                        validated.push(item);
                        for unchained in chain.into_iter().rev() {
                            queue.push_front(unchained);
                        }
                    }
                }
            } else {
                validated.push(item);
            }
        }

        validated
    }

    /// Warns about an item with no slot and says whether it is kept
    fn keep_unknown(&self, ctx: &mut ValidationContext, bit_type: &BitType, item: &BitContent) -> bool {
        let subject = describe(item);
        match item.type_key {
            TypeKey::Property => {
                ctx.add_warning(
                    WarningKind::ExtraProperty,
                    format!("{subject} is an unknown property. It can be excluded from the output using the 'excludeUnknownProperties' flag"),
                    item.parser,
                    None,
                );
                true
            }
            TypeKey::Resource => {
                ctx.add_warning(
                    WarningKind::ExcessResource,
                    format!("{subject} is not expected here. It will be ignored"),
                    item.parser,
                    None,
                );
                true
            }
            TypeKey::CardSet => {
                ctx.add_warning(
                    WarningKind::UnexpectedCardSet,
                    format!("Bit '{bit_type}' should not have a card set. It will be ignored"),
                    item.parser,
                    None,
                );
                false
            }
            _ => {
                ctx.add_warning(
                    WarningKind::Invalid,
                    format!("{subject} is not valid here. It will be ignored"),
                    item.parser,
                    None,
                );
                false
            }
        }
    }

    fn validate_card_set(
        &self,
        ctx: &mut ValidationContext,
        bit_type: &BitType,
        bit: &BitConfig,
        item: &mut BitContent,
    ) {
        let Some(card_set_config) = &bit.card_set else {
            return;
        };
        let item_location = item.parser;
        let Some(ContentValue::CardSet(card_set)) = item.value.as_mut() else {
            return;
        };

        for card in card_set.cards.iter_mut() {
            for (side_no, side) in card.sides.iter_mut().enumerate() {
                for (variant_no, variant) in side.variants.iter_mut().enumerate() {
                    let content = std::mem::take(variant);
                    let location = content.first().and_then(|i| i.parser).or(item_location);
                    let had_content = !content.is_empty();
                    let kept = match card_set_config.variant(side_no, variant_no) {
                        Some(config) => self.validate_variant(ctx, bit_type, bit, config, content),
                        None => Vec::new(),
                    };
                    if kept.is_empty() && had_content {
                        ctx.add_warning(
                            WarningKind::UnexpectedCardSideVariant,
                            "'cardSet' has a card / side / variant that is not expected here. It will be ignored",
                            location,
                            None,
                        );
                    }
                    *variant = kept;
                }
            }
        }
    }

    fn validate_variant(
        &self,
        ctx: &mut ValidationContext,
        bit_type: &BitType,
        bit: &BitConfig,
        config: &CardVariantConfig,
        content: Vec<BitContent>,
    ) -> Vec<BitContent> {
        let slots = Slots::with_tags(ContentLevel::Card, config.tags.values());
        self.validate_level(ctx, bit_type, bit, &slots, content)
    }

    /// Warns when a bit that takes no body has one
    pub fn check_body(
        &self,
        ctx: &mut ValidationContext,
        bit_type: &BitType,
        body: &str,
    ) -> Result<(), BitmarkError> {
        let bit = self.resolver.get_bit_config(bit_type)?;
        if !body.trim().is_empty() && !bit.body_allowed {
            ctx.add_warning(
                WarningKind::BodyNotAllowed,
                format!("Bit '{bit_type}' should not have a body."),
                None,
                None,
            );
        }
        Ok(())
    }

    pub fn check_body_part(&self, ctx: &mut ValidationContext, bit_type: &BitType, part: &str) {
        self.warn_common_mistakes(ctx, bit_type, part);
    }

    pub fn check_footer(
        &self,
        ctx: &mut ValidationContext,
        bit_type: &BitType,
        footer: &str,
    ) -> Result<(), BitmarkError> {
        if footer.is_empty() {
            return Ok(());
        }
        let bit = self.resolver.get_bit_config(bit_type)?;
        self.warn_common_mistakes(ctx, bit_type, footer);
        if !bit.footer_allowed {
            ctx.add_warning(
                WarningKind::FooterNotAllowed,
                format!("Bit '{bit_type}' should not have a footer."),
                None,
                None,
            );
        }
        Ok(())
    }

    /// Checks the body of one card variant. Positions are zero based.
    pub fn check_card_body(
        &self,
        ctx: &mut ValidationContext,
        bit_type: &BitType,
        card_body: &str,
        card_no: usize,
        side_no: usize,
        variant_no: usize,
    ) -> Result<(), BitmarkError> {
        if card_body.is_empty() {
            return Ok(());
        }
        self.warn_common_mistakes(ctx, bit_type, card_body);
        let bit = self.resolver.get_bit_config(bit_type)?;
        let Some(variant) = bit
            .card_set
            .as_ref()
            .and_then(|card_set| card_set.variant(side_no, variant_no))
        else {
            return Ok(());
        };
        if !variant.body_allowed {
            ctx.add_warning(
                WarningKind::CardBodyNotAllowed,
                format!(
                    "Bit '{bit_type}' should not have a card body at card:{}, side:{}, variant:{}.",
                    card_no + 1,
                    side_no + 1,
                    variant_no + 1
                ),
                None,
                None,
            );
        }
        Ok(())
    }

    fn warn_common_mistakes(&self, ctx: &mut ValidationContext, bit_type: &BitType, body: &str) {
        if !self.check_common_mistakes {
            return;
        }
        for mistake in find_common_mistakes(body) {
            ctx.add_warning(
                WarningKind::CommonMistake,
                format!(
                    "Bit '{bit_type}' might contain a mistake: {}",
                    mistake.escape_debug()
                ),
                None,
                None,
            );
        }
    }
}
