//! Configuration types
//!
//! Board-agnostic bench configuration and the `bench.toml` parser.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError, ParseErrorKind};
pub use types::*;
