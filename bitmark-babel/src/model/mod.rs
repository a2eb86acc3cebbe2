//! Shared value types used across the breakscape, config, validator and text modules.

pub mod count;
pub mod text_format;

pub use count::Count;
pub use text_format::{TextFormat, TextLocation};
