//! JSON token types for the feed scanner.

/// A single JSON token pulled from the feed stream.
///
/// Numbers are carried as raw text; only recognized fields (prices) are
/// ever parsed further, and a non-numeric price must reject one variant
/// rather than the whole stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    Comma,
    Colon,
    String(String),
    Number(String),
    Bool(bool),
    Null,
    Eof,
}

impl Token {
    /// Short token name for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Token::ObjectStart => "'{'",
            Token::ObjectEnd => "'}'",
            Token::ArrayStart => "'['",
            Token::ArrayEnd => "']'",
            Token::Comma => "','",
            Token::Colon => "':'",
            Token::String(_) => "string",
            Token::Number(_) => "number",
            Token::Bool(_) => "boolean",
            Token::Null => "null",
            Token::Eof => "end of input",
        }
    }

    /// Whether this token opens or is a complete scalar value.
    pub fn starts_value(&self) -> bool {
        matches!(
            self,
            Token::ObjectStart
                | Token::ArrayStart
                | Token::String(_)
                | Token::Number(_)
                | Token::Bool(_)
                | Token::Null
        )
    }
}
