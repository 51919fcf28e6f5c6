//! Feed parser implementation.
//!
//! `FeedParser` walks the token stream produced by the scanner and
//! yields accepted products one at a time. Acceptance rules:
//!
//! - A product needs a non-null `title`, a non-null `vendor`, and a
//!   `variants` array (possibly empty). Anything else is discarded
//!   silently; discards do not end iteration and are never errors.
//! - A variant needs a parsable `price`, a boolean `available`, and a
//!   non-blank `option1` (the color). Failing variants are dropped from
//!   their parent, which may still be accepted with fewer variants.
//! - Unknown fields at any depth are skipped without error.
//!
//! Structural corruption of the stream is fatal: the first `Err` is
//! yielded and iteration ends. The caller bounds total work with
//! `Iterator::take`; nothing past the consumed tokens is ever read.

use crate::lexer::{Scanner, Token};
use rust_decimal::Decimal;
use shopfeed_core::{FeedError, NewProduct, NewVariant, NOT_APPLICABLE_SIZE};
use std::io::Read;
use std::str::FromStr;
use tracing::debug;

/// Field name of the top-level product array in the feed document.
const PRODUCTS_FIELD: &str = "products";

/// Pick the variant size from the feed's option slots.
///
/// Prefers `option3`, then `option2`, when present, non-blank, and not
/// the literal token `"null"`; otherwise falls back to the sentinel.
pub fn select_size_option(option2: Option<&str>, option3: Option<&str>) -> String {
    for candidate in [option3, option2].into_iter().flatten() {
        if !candidate.trim().is_empty() && candidate != "null" {
            return candidate.to_string();
        }
    }
    NOT_APPLICABLE_SIZE.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    /// Haven't located the top-level product array yet.
    Start,
    /// Positioned inside the product array.
    InProducts,
    /// Array finished, error yielded, or input exhausted.
    Finished,
}

/// Non-restartable pull parser over a feed byte stream.
pub struct FeedParser<R: Read> {
    scanner: Scanner<R>,
    state: ParserState,
}

impl<R: Read> FeedParser<R> {
    /// Create a parser over the given byte stream.
    pub fn new(reader: R) -> Self {
        Self {
            scanner: Scanner::new(reader),
            state: ParserState::Start,
        }
    }

    /// Bytes consumed from the underlying stream so far.
    pub fn bytes_consumed(&self) -> u64 {
        self.scanner.bytes_consumed()
    }

    fn unexpected(&self, wanted: &str, got: &Token) -> FeedError {
        FeedError::Malformed {
            offset: self.bytes_consumed(),
            reason: format!("expected {wanted}, found {}", got.describe()),
        }
    }

    fn expect_colon(&mut self) -> Result<(), FeedError> {
        match self.scanner.next_token()? {
            Token::Colon => Ok(()),
            other => Err(self.unexpected("':'", &other)),
        }
    }

    /// Walk top-level fields until the product array opens. Returns
    /// false when the document closes without one.
    fn advance_to_products(&mut self) -> Result<bool, FeedError> {
        match self.scanner.next_token()? {
            Token::ObjectStart => {}
            other => return Err(self.unexpected("object at document root", &other)),
        }
        loop {
            match self.scanner.next_token()? {
                Token::ObjectEnd => return Ok(false),
                Token::Comma => continue,
                Token::String(name) => {
                    self.expect_colon()?;
                    if name == PRODUCTS_FIELD {
                        match self.scanner.next_token()? {
                            Token::ArrayStart => return Ok(true),
                            other => return Err(self.unexpected("product array", &other)),
                        }
                    }
                    self.skip_value()?;
                }
                other => return Err(self.unexpected("field name", &other)),
            }
        }
    }

    /// Scan forward to the next accepted product, or the array end.
    fn next_item(&mut self) -> Result<Option<NewProduct>, FeedError> {
        loop {
            match self.scanner.next_token()? {
                Token::ArrayEnd => {
                    // Stop here; the rest of the document is never read.
                    self.state = ParserState::Finished;
                    return Ok(None);
                }
                Token::Comma => continue,
                Token::ObjectStart => {
                    if let Some(product) = self.parse_item()? {
                        return Ok(Some(product));
                    }
                }
                other => return Err(self.unexpected("product object", &other)),
            }
        }
    }

    /// Parse one product object. Returns `None` (silent discard) when
    /// title, vendor, or the variants array is missing or null.
    fn parse_item(&mut self) -> Result<Option<NewProduct>, FeedError> {
        let mut title: Option<String> = None;
        let mut vendor: Option<String> = None;
        let mut product_type: Option<String> = None;
        let mut variants: Option<Vec<NewVariant>> = None;

        loop {
            match self.scanner.next_token()? {
                Token::ObjectEnd => break,
                Token::Comma => continue,
                Token::String(field) => {
                    self.expect_colon()?;
                    match field.as_str() {
                        "title" => title = self.string_value()?,
                        "vendor" => vendor = self.string_value()?,
                        "product_type" => product_type = self.string_value()?,
                        "variants" => match self.scanner.next_token()? {
                            Token::ArrayStart => variants = Some(self.parse_variants()?),
                            Token::Null => variants = None,
                            other => self.skip_value_from(other)?,
                        },
                        _ => self.skip_value()?,
                    }
                }
                other => return Err(self.unexpected("field name", &other)),
            }
        }

        match (title, vendor, variants) {
            (Some(title), Some(vendor), Some(variants)) => Ok(Some(NewProduct {
                title,
                vendor,
                product_type,
                variants,
            })),
            _ => {
                debug!("discarding feed product missing title, vendor, or variants");
                Ok(None)
            }
        }
    }

    fn parse_variants(&mut self) -> Result<Vec<NewVariant>, FeedError> {
        let mut out = Vec::new();
        loop {
            match self.scanner.next_token()? {
                Token::ArrayEnd => return Ok(out),
                Token::Comma => continue,
                Token::ObjectStart => {
                    if let Some(variant) = self.parse_variant()? {
                        out.push(variant);
                    }
                }
                other => return Err(self.unexpected("variant object", &other)),
            }
        }
    }

    /// Parse one variant object. Returns `None` (silent discard) when
    /// the price is missing or unparsable, the availability flag is
    /// absent, or the primary option is blank.
    fn parse_variant(&mut self) -> Result<Option<NewVariant>, FeedError> {
        let mut price_text: Option<String> = None;
        let mut available: Option<bool> = None;
        let mut option1: Option<String> = None;
        let mut option2: Option<String> = None;
        let mut option3: Option<String> = None;

        loop {
            match self.scanner.next_token()? {
                Token::ObjectEnd => break,
                Token::Comma => continue,
                Token::String(field) => {
                    self.expect_colon()?;
                    match field.as_str() {
                        "price" => price_text = self.string_value()?,
                        "available" => available = self.bool_value()?,
                        "option1" => option1 = self.string_value()?,
                        "option2" => option2 = self.string_value()?,
                        "option3" => option3 = self.string_value()?,
                        _ => self.skip_value()?,
                    }
                }
                other => return Err(self.unexpected("field name", &other)),
            }
        }

        let Some(price_text) = price_text else {
            return Ok(None);
        };
        let Ok(price) = Decimal::from_str(price_text.trim()) else {
            debug!(price = %price_text, "discarding variant with non-numeric price");
            return Ok(None);
        };
        let Some(available) = available else {
            return Ok(None);
        };
        let Some(color) = option1.filter(|c| !c.trim().is_empty()) else {
            return Ok(None);
        };

        Ok(Some(NewVariant {
            color_option: color,
            size_option: Some(select_size_option(option2.as_deref(), option3.as_deref())),
            price,
            available,
        }))
    }

    /// Read one value as text. Scalars map to their text form, `null`
    /// to `None`; a nested object or array is skipped and treated as
    /// absent.
    fn string_value(&mut self) -> Result<Option<String>, FeedError> {
        match self.scanner.next_token()? {
            Token::String(s) => Ok(Some(s)),
            Token::Number(n) => Ok(Some(n)),
            Token::Bool(b) => Ok(Some(b.to_string())),
            Token::Null => Ok(None),
            open @ (Token::ObjectStart | Token::ArrayStart) => {
                self.skip_value_from(open)?;
                Ok(None)
            }
            other => Err(self.unexpected("value", &other)),
        }
    }

    /// Read one value as a boolean. Only `true`/`false` (or their text
    /// forms) count; anything else leaves the flag absent.
    fn bool_value(&mut self) -> Result<Option<bool>, FeedError> {
        match self.scanner.next_token()? {
            Token::Bool(b) => Ok(Some(b)),
            Token::String(s) => Ok(s.parse::<bool>().ok()),
            Token::Null | Token::Number(_) => Ok(None),
            open @ (Token::ObjectStart | Token::ArrayStart) => {
                self.skip_value_from(open)?;
                Ok(None)
            }
            other => Err(self.unexpected("value", &other)),
        }
    }

    /// Skip one complete value of any shape.
    fn skip_value(&mut self) -> Result<(), FeedError> {
        let token = self.scanner.next_token()?;
        self.skip_value_from(token)
    }

    fn skip_value_from(&mut self, token: Token) -> Result<(), FeedError> {
        let mut depth = match token {
            Token::String(_) | Token::Number(_) | Token::Bool(_) | Token::Null => return Ok(()),
            Token::ObjectStart | Token::ArrayStart => 1u32,
            other => return Err(self.unexpected("value", &other)),
        };
        while depth > 0 {
            match self.scanner.next_token()? {
                Token::ObjectStart | Token::ArrayStart => depth += 1,
                Token::ObjectEnd | Token::ArrayEnd => depth -= 1,
                Token::Eof => return Err(self.unexpected("value", &Token::Eof)),
                _ => {}
            }
        }
        Ok(())
    }
}

impl<R: Read> Iterator for FeedParser<R> {
    type Item = Result<NewProduct, FeedError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                ParserState::Finished => return None,
                ParserState::Start => match self.advance_to_products() {
                    Ok(true) => self.state = ParserState::InProducts,
                    Ok(false) => {
                        self.state = ParserState::Finished;
                        return None;
                    }
                    Err(e) => {
                        self.state = ParserState::Finished;
                        return Some(Err(e));
                    }
                },
                ParserState::InProducts => {
                    return match self.next_item() {
                        Ok(Some(product)) => Some(Ok(product)),
                        Ok(None) => None,
                        Err(e) => {
                            self.state = ParserState::Finished;
                            Some(Err(e))
                        }
                    };
                }
            }
        }
    }
}
