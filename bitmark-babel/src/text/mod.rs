//! Body text: the text AST, a traversal over it, and the bitmark text generator

pub mod ast;
pub mod generator;
pub mod walk;

pub use ast::{TextAst, TextMark, TextMarkType, TextNode, TextNodeType};
pub use generator::{TextGenerator, TextGeneratorOptions, PLAIN_TEXT_DIVIDER};
pub use walk::{walk, Descend, Route, TextVisitor};
