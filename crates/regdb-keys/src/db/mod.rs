//! Wireless regulatory database: model and db.txt parser.
//!
//! The database lists frequency bands, power limits and the rules each
//! country builds from them. Its compiled form is what the trusted keys
//! sign.

mod parser;
mod types;

pub use parser::{DbParser, ParseWarning};
pub use types::*;
