//! Bit configuration, validation and text generation for bitmark
//!
//!     This crate is the format-independent core of the bitmark tooling. It knows how bits are
//!     configured, how their tags are checked against that configuration, how free text is
//!     escaped so it can sit inside markup, and how the JSON text AST is turned back into
//!     bitmark text.
//!
//!     TLDR:
//!         - Parsing bitmark markup is not done here. Callers hand in already parsed bit content.
//!         - Configuration tables are data (data/tables.json), resolved into typed records once.
//!         - Problems in user markup are warnings on a ValidationContext, never errors.
//!         - Errors are reserved for broken configuration and format plumbing.
//!
//! Architecture
//!
//!     The configuration side is a small pipeline: raw tables are loaded and checked for
//!     integrity, bit definitions are merged along their inheritance chain, group references are
//!     hydrated into concrete tags, and the result is cached per bit type by the
//!     ConfigResolver. Everything downstream (card-set lookup, resource resolution, validation)
//!     asks the resolver.
//!
//!     This is a pure lib: no code here supposes a shell environment, be it printing, env vars
//!     or process exit codes. The bitmark-cli crate does that.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── model                   # Count, TextFormat, TextLocation
//!     ├── breakscape.rs           # escaping of reserved sequences
//!     ├── config
//!     │   ├── tables.rs           # raw tables and their integrity checks
//!     │   ├── hydrator.rs         # group expansion
//!     │   ├── bit_config.rs       # resolved records
//!     │   ├── resolver.rs         # the caching service
//!     │   ├── card_set.rs         # card-set variant lookup
//!     │   └── resources.rs        # resource attachment handling
//!     ├── validator               # tag and body validation
//!     ├── text
//!     │   ├── ast.rs              # the JSON text AST
//!     │   ├── walk.rs             # depth-first traversal
//!     │   └── generator.rs        # text AST to bitmark text
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     └── formats                 # json, bitmark, text
//!
//! Testing
//!
//!     Unit tests sit next to the code. tests/ holds the end to end scenarios, one test binary
//!     with a module per area.
//!
//! Core Algorithms
//!
//!     Validation is a single pass over the items of a content level. Each configured tag owns a
//!     slot counting what it has seen; items are matched to slots by type and key. Overflowing
//!     a slot warns but keeps the item, so the last occurrence wins. Items matching no slot are
//!     dropped, except properties and resources which pass through flagged. Chained items are
//!     validated as a nested level against the chain of the tag that accepted their parent.
//!
//!     Text generation is a depth-first walk that appends to a buffer and keeps adjacent writes
//!     from forming markup by accident. See text/generator.rs.

pub mod breakscape;
pub mod config;
pub mod error;
pub mod format;
pub mod formats;
pub mod model;
pub mod registry;
pub mod text;
pub mod validator;

pub use breakscape::{breakscape, unbreakscape, BreakscapeOptions, BreakscapedString};
pub use config::{BitConfig, BitType, ConfigResolver, ConfigTables};
pub use error::BitmarkError;
pub use format::Format;
pub use model::{Count, TextFormat, TextLocation};
pub use registry::FormatRegistry;
pub use text::{TextAst, TextGenerator, TextGeneratorOptions};
pub use validator::{BitContent, TagValidator, ValidationContext, ValidationWarning};
