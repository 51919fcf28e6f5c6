//! Pull-based product extraction from the token stream.

pub mod parser;

pub use parser::{select_size_option, FeedParser};
