//! SHOPFEED Feed - Streaming Product Feed Parser
//!
//! Incremental extraction of catalog products from an arbitrarily large
//! JSON feed document, without materializing the document in memory:
//!
//! - `lexer`: a buffered byte scanner that pulls one JSON token at a
//!   time from any `std::io::Read`.
//! - `parser`: a pull-based `FeedParser` iterator that walks the token
//!   stream, yields accepted products, and silently discards records
//!   that fail the field-presence rules.
//!
//! The caller bounds the work by simply stopping consumption (for
//! example with `Iterator::take`); the scanner never reads past the
//! tokens needed for what was consumed.

pub mod lexer;
pub mod parser;

pub use lexer::{Scanner, Token};
pub use parser::{select_size_option, FeedParser};
