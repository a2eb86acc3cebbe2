//! Card-set variant lookup

use super::bit_config::{CardSetConfig, CardVariantConfig, TagsConfig};
use super::resolver::{BitType, ConfigResolver};
use crate::error::BitmarkError;

impl CardSetConfig {
    /// Locates the variant config for a card position.
    ///
    /// A side index past the end reuses the last side. A variant index past the end reuses the
    /// last variant of the side whatever its `repeat_count`.
    pub fn variant(&self, side: usize, variant: usize) -> Option<&CardVariantConfig> {
        let last_side = self.sides.len().checked_sub(1)?;
        let variants = &self.sides[side.min(last_side)].variants;
        variants.get(variant).or_else(|| variants.last())
    }
}

impl ConfigResolver {
    pub fn get_card_set_variant_config(
        &self,
        bit_type: &BitType,
        side: usize,
        variant: usize,
    ) -> Result<Option<CardVariantConfig>, BitmarkError> {
        let config = self.get_bit_config(bit_type)?;
        Ok(config
            .card_set
            .as_ref()
            .and_then(|card_set| card_set.variant(side, variant))
            .cloned())
    }

    /// Tags of the located variant, if the bit has a card set
    pub fn get_tags_config_for_card_set(
        &self,
        bit_type: &BitType,
        side: usize,
        variant: usize,
    ) -> Result<Option<TagsConfig>, BitmarkError> {
        Ok(self
            .get_card_set_variant_config(bit_type, side, variant)?
            .map(|variant| variant.tags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::bit_config::CardSideConfig;
    use crate::model::Count;

    #[test]
    fn variant_overflow_repeats_infinite_last_variant() {
        let resolver = ConfigResolver::builtin().unwrap();
        let flashcard = resolver.get_bit_type("flashcard");
        let variant = resolver
            .get_card_set_variant_config(&flashcard, 1, 5)
            .unwrap()
            .unwrap();
        assert_eq!(variant.repeat_count, Count::Infinity);
    }

    #[test]
    fn variant_overflow_repeats_finite_last_variant_too() {
        let resolver = ConfigResolver::builtin().unwrap();
        let matching = resolver.get_bit_type("match");
        let last = resolver
            .get_card_set_variant_config(&matching, 1, 1)
            .unwrap();
        let overflow = resolver
            .get_card_set_variant_config(&matching, 1, 7)
            .unwrap();
        assert!(overflow.is_some());
        assert_eq!(overflow, last);
    }

    #[test]
    fn side_overflow_clamps_to_last_side() {
        let resolver = ConfigResolver::builtin().unwrap();
        let flashcard = resolver.get_bit_type("flashcard");
        let clamped = resolver.get_tags_config_for_card_set(&flashcard, 9, 0).unwrap();
        let last = resolver.get_tags_config_for_card_set(&flashcard, 1, 0).unwrap();
        assert_eq!(clamped, last);
    }

    #[test]
    fn bits_without_card_set_have_no_variants() {
        let resolver = ConfigResolver::builtin().unwrap();
        let article = resolver.get_bit_type("article");
        assert_eq!(
            resolver.get_card_set_variant_config(&article, 0, 0).unwrap(),
            None
        );
    }

    #[test]
    fn empty_side_has_no_variant() {
        let card_set = CardSetConfig {
            key: "empty".to_string(),
            sides: vec![CardSideConfig { variants: vec![] }],
        };
        assert!(card_set.variant(0, 0).is_none());
    }
}
