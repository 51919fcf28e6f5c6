//! Incremental JSON lexer over a byte stream.

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::Token;
