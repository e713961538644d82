//! Property-map literal parser for animation parameters.
//!
//! Content authors write animation states as object literals in the CMS:
//!
//! ```text
//! { y: 120, opacity: 0, scale: 1.2, rotation: '-5deg', }
//! ```
//!
//! This module parses that text into a [`PropertyMap`] without evaluating
//! anything. The grammar is JSON with the relaxations authors rely on:
//!
//! - bare identifier keys (`opacity`, `$x`, `_y`)
//! - single-quoted strings
//! - trailing commas
//! - `//` line and `/* */` block comments
//! - leading `+` and leading `.` on numbers
//!
//! Everything else (function calls, identifiers as values, template strings)
//! is rejected with the byte offset of the offending input.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Parsed animation properties, keyed by property name.
pub type PropertyMap = Map<String, Value>;

/// Nesting limit for objects and arrays.
const MAX_DEPTH: usize = 32;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LiteralError {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unexpected character '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },
    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },
    #[error("unterminated comment at offset {offset}")]
    UnterminatedComment { offset: usize },
    #[error("nesting deeper than {} levels at offset {offset}", MAX_DEPTH)]
    TooDeep { offset: usize },
    #[error("top-level value must be an object")]
    NotAnObject,
}

/// True for input that carries no properties: whitespace-only or `{}`.
///
/// Blank parameters mean "not animated", which is not an error.
pub fn is_blank_literal(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed == "{}"
}

/// Parse an object literal into a property map.
pub fn parse_property_map(text: &str) -> Result<PropertyMap, LiteralError> {
    let mut parser = Parser { src: text, pos: 0 };
    parser.skip_trivia()?;
    let value = parser.value(0)?;
    parser.skip_trivia()?;
    if let Some(found) = parser.peek() {
        return Err(LiteralError::Unexpected {
            found,
            offset: parser.pos,
        });
    }
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(LiteralError::NotAnObject),
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.src[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn unexpected(&self) -> LiteralError {
        match self.peek() {
            Some(found) => LiteralError::Unexpected {
                found,
                offset: self.pos,
            },
            None => LiteralError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, want: char) -> Result<(), LiteralError> {
        if self.peek() == Some(want) {
            self.pos += want.len_utf8();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Result<(), LiteralError> {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.pos;
                    let rest = &self.src[self.pos + 2..];
                    match rest.find("*/") {
                        Some(end) => self.pos += 2 + end + 2,
                        None => return Err(LiteralError::UnterminatedComment { offset: start }),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn value(&mut self, depth: usize) -> Result<Value, LiteralError> {
        if depth > MAX_DEPTH {
            return Err(LiteralError::TooDeep { offset: self.pos });
        }
        match self.peek() {
            Some('{') => self.object(depth).map(Value::Object),
            Some('[') => self.array(depth),
            Some('"') | Some('\'') => self.string().map(Value::String),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) if is_ident_start(c) => {
                let start = self.pos;
                match self.identifier() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" => Ok(Value::Null),
                    _ => {
                        self.pos = start;
                        Err(self.unexpected())
                    }
                }
            }
            _ => Err(self.unexpected()),
        }
    }

    fn object(&mut self, depth: usize) -> Result<PropertyMap, LiteralError> {
        self.expect('{')?;
        let mut map = PropertyMap::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.bump();
                return Ok(map);
            }
            let key = self.key()?;
            self.skip_trivia()?;
            self.expect(':')?;
            self.skip_trivia()?;
            let value = self.value(depth + 1)?;
            // Later duplicates override earlier ones.
            map.insert(key, value);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {}
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn array(&mut self, depth: usize) -> Result<Value, LiteralError> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(']') {
                self.bump();
                return Ok(Value::Array(items));
            }
            items.push(self.value(depth + 1)?);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {}
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn key(&mut self) -> Result<String, LiteralError> {
        match self.peek() {
            Some('"') | Some('\'') => self.string(),
            Some(c) if is_ident_start(c) => Ok(self.identifier().to_string()),
            _ => Err(self.unexpected()),
        }
    }

    fn identifier(&mut self) -> &'a str {
        let src = self.src;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !is_ident_continue(c) {
                break;
            }
            self.bump();
        }
        &src[start..self.pos]
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let quote = self.bump().ok_or(LiteralError::UnexpectedEnd)?;
        let mut out = String::new();
        loop {
            let offset = self.pos;
            match self.bump() {
                None => return Err(LiteralError::UnexpectedEnd),
                Some(c) if c == quote => return Ok(out),
                Some('\n') => {
                    return Err(LiteralError::Unexpected {
                        found: '\n',
                        offset,
                    });
                }
                Some('\\') => out.push(self.escape(offset)?),
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, offset: usize) -> Result<char, LiteralError> {
        let c = self.bump().ok_or(LiteralError::UnexpectedEnd)?;
        let decoded = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            '0' => '\0',
            '\\' | '\'' | '"' | '/' => c,
            'u' => self.unicode_escape(offset)?,
            _ => return Err(LiteralError::InvalidEscape { offset }),
        };
        Ok(decoded)
    }

    /// Four hex digits after `\u`. A high surrogate must be followed by a
    /// `\u` low surrogate; the pair decodes to one char.
    fn unicode_escape(&mut self, offset: usize) -> Result<char, LiteralError> {
        let high = self.hex4(offset)?;
        if !(0xD800..=0xDBFF).contains(&high) {
            return char::from_u32(high).ok_or(LiteralError::InvalidEscape { offset });
        }
        if self.src[self.pos..].starts_with("\\u") {
            self.pos += 2;
        } else {
            return Err(LiteralError::InvalidEscape { offset });
        }
        let low = self.hex4(offset)?;
        if !(0xDC00..=0xDFFF).contains(&low) {
            return Err(LiteralError::InvalidEscape { offset });
        }
        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        char::from_u32(code).ok_or(LiteralError::InvalidEscape { offset })
    }

    fn hex4(&mut self, offset: usize) -> Result<u32, LiteralError> {
        let end = self.pos + 4;
        let hex = self
            .src
            .get(self.pos..end)
            .filter(|h| h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or(LiteralError::InvalidEscape { offset })?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| LiteralError::InvalidEscape { offset })?;
        self.pos = end;
        Ok(code)
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.bump();
        }
        while let Some(c) = self.peek() {
            let exponent_sign =
                (c == '-' || c == '+') && matches!(self.src[..self.pos].chars().last(), Some('e' | 'E'));
            if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || exponent_sign {
                self.bump();
            } else {
                break;
            }
        }
        let text = &self.src[start..self.pos];
        let invalid = || LiteralError::InvalidNumber {
            text: text.to_string(),
            offset: start,
        };
        let unsigned = text.trim_start_matches('+');
        if !unsigned.contains(['.', 'e', 'E']) {
            if let Ok(int) = unsigned.parse::<i64>() {
                return Ok(Value::Number(int.into()));
            }
        }
        let float: f64 = unsigned.parse().map_err(|_| invalid())?;
        Number::from_f64(float).map(Value::Number).ok_or_else(invalid)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_bare_keys_and_numbers() {
        let map = parse_property_map("{ y: 120, opacity: 0, scale: 1.25 }").unwrap();
        assert_eq!(map["y"], json!(120));
        assert_eq!(map["opacity"], json!(0));
        assert_eq!(map["scale"], json!(1.25));
    }

    #[test]
    fn parses_single_and_double_quoted_strings() {
        let map = parse_property_map(r#"{ x: '-50%', "rotation": "10deg" }"#).unwrap();
        assert_eq!(map["x"], json!("-50%"));
        assert_eq!(map["rotation"], json!("10deg"));
    }

    #[test]
    fn accepts_trailing_comma_and_comments() {
        let text = "{\n  // start hidden\n  opacity: 0, /* and low */ y: -40,\n}";
        let map = parse_property_map(text).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["y"], json!(-40));
    }

    #[test]
    fn parses_nested_values() {
        let map =
            parse_property_map("{ ease: 'none', transformOrigin: null, path: [1, 2.5, -3], css: { zIndex: 2 } }")
                .unwrap();
        assert_eq!(map["path"], json!([1, 2.5, -3]));
        assert_eq!(map["css"], json!({ "zIndex": 2 }));
        assert_eq!(map["transformOrigin"], Value::Null);
    }

    #[test]
    fn leading_plus_and_dot_numbers() {
        let map = parse_property_map("{ a: +5, b: .5, c: -.25, d: 1e3, e: 2E-2 }").unwrap();
        assert_eq!(map["a"], json!(5));
        assert_eq!(map["b"], json!(0.5));
        assert_eq!(map["c"], json!(-0.25));
        assert_eq!(map["d"], json!(1000.0));
        assert_eq!(map["e"], json!(0.02));
    }

    #[test]
    fn duplicate_keys_keep_last_value() {
        let map = parse_property_map("{ y: 1, y: 2 }").unwrap();
        assert_eq!(map["y"], json!(2));
    }

    #[test]
    fn string_escapes_are_decoded() {
        let map = parse_property_map(r#"{ label: 'it\'s A\n' }"#).unwrap();
        assert_eq!(map["label"], json!("it's A\n"));
    }

    #[test]
    fn surrogate_pair_escape_decodes_to_one_char() {
        let map = parse_property_map(r"{ icon: '\uD83D\uDE00', e: '\u00e9' }").unwrap();
        assert_eq!(map["icon"], json!("\u{1F600}"));
        assert_eq!(map["e"], json!("\u{e9}"));
    }

    #[test]
    fn lone_surrogate_escape_is_rejected() {
        assert!(matches!(
            parse_property_map(r"{ a: '\uD83D' }"),
            Err(LiteralError::InvalidEscape { .. })
        ));
        assert!(matches!(
            parse_property_map(r"{ a: '\uD83DA' }"),
            Err(LiteralError::InvalidEscape { .. })
        ));
        assert!(matches!(
            parse_property_map(r"{ a: '\uDE00' }"),
            Err(LiteralError::InvalidEscape { .. })
        ));
    }

    #[test]
    fn empty_object_parses_to_empty_map() {
        assert!(parse_property_map(" { } ").unwrap().is_empty());
    }

    #[test]
    fn function_call_is_rejected() {
        let err = parse_property_map("{ y: alert(1) }").unwrap_err();
        assert_eq!(
            err,
            LiteralError::Unexpected {
                found: 'a',
                offset: 5
            }
        );
    }

    #[test]
    fn missing_closing_brace_is_unexpected_end() {
        assert_eq!(
            parse_property_map("{ y: 10").unwrap_err(),
            LiteralError::UnexpectedEnd
        );
    }

    #[test]
    fn non_object_top_level_is_rejected() {
        assert_eq!(parse_property_map("[1, 2]").unwrap_err(), LiteralError::NotAnObject);
        assert_eq!(parse_property_map("42").unwrap_err(), LiteralError::NotAnObject);
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let err = parse_property_map("{ y: 1 } x").unwrap_err();
        assert!(matches!(err, LiteralError::Unexpected { found: 'x', .. }));
    }

    #[test]
    fn malformed_number_is_reported() {
        let err = parse_property_map("{ y: 1.2.3 }").unwrap_err();
        assert!(matches!(err, LiteralError::InvalidNumber { offset: 5, .. }));
    }

    #[test]
    fn unterminated_block_comment_is_reported() {
        let err = parse_property_map("{ /* y: 1 }").unwrap_err();
        assert_eq!(err, LiteralError::UnterminatedComment { offset: 2 });
    }

    #[test]
    fn nesting_limit_is_enforced() {
        let text = format!("{{ a: {}{} }}", "[".repeat(40), "]".repeat(40));
        assert!(matches!(
            parse_property_map(&text).unwrap_err(),
            LiteralError::TooDeep { .. }
        ));
    }

    #[test]
    fn blank_literal_detection() {
        assert!(is_blank_literal(""));
        assert!(is_blank_literal("   "));
        assert!(is_blank_literal(" {} "));
        assert!(!is_blank_literal("{ y: 1 }"));
        assert!(!is_blank_literal("{ }"));
    }
}
