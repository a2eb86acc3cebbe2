//! Format implementations
//!
//! Each format converts between the text AST and a string representation.

pub mod bitmark;
pub mod json;
pub mod text;

pub use bitmark::BitmarkFormat;
pub use json::JsonFormat;
pub use text::PlainTextFormat;
