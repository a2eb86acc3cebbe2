//! Bit configuration
//!
//! Tables hold the declarative schema; the [`ConfigResolver`] turns them into merged,
//! hydrated [`BitConfig`] values on demand.
//!
//!     tables.rs      # raw tables, prefix-discriminated tag references, integrity checks
//!     hydrator.rs    # group expansion and chain hydration
//!     bit_config.rs  # resolved records and their human readable dump
//!     resolver.rs    # the caching service
//!     card_set.rs    # card-set variant lookup
//!     resources.rs   # resource tags adjusted for a header attachment

pub mod bit_config;
mod card_set;
pub mod hydrator;
mod resolver;
mod resources;
pub mod tables;

pub use bit_config::{
    BitConfig, CardSetConfig, CardSideConfig, CardVariantConfig, TagConfig, TagKind, TagsConfig,
};
pub use hydrator::{hydrate_tags, HydratedTags};
pub use resolver::{BitType, ConfigResolver};
pub use resources::ResourcesConfig;
pub use tables::{ConfigTables, PropertyFormat, TagRef, TagRefKind, ERROR_BIT, STANDARD_BIT};
