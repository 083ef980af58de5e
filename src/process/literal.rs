// src/process/literal.rs
//! Reader for the `{...}` / `[...]` literal text the annotation extractor
//! writes into CSV cells.
//!
//! Supports the subset of Python literal syntax that shows up in practice:
//! single/double-quoted strings (with backslash escapes and implicit
//! concatenation), integers, floats, `True`/`False`/`None`, lists, tuples,
//! sets and dicts, with optional trailing commas. Values come back as
//! [`serde_json::Value`]; tuples and sets become arrays.

use serde_json::{Map, Number, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid literal at char {pos}: {message}")]
pub struct LiteralError {
    pub pos: usize,
    pub message: String,
}

/// Parse a complete literal. Trailing non-whitespace is an error.
pub fn parse_literal(text: &str) -> Result<Value, LiteralError> {
    let mut p = Parser {
        chars: text.chars().collect(),
        pos: 0,
        depth: 0,
    };
    let v = p.value()?;
    p.skip_ws();
    if p.pos < p.chars.len() {
        return Err(p.err("unexpected trailing input"));
    }
    Ok(v)
}

/// Decode a mapping cell. Anything that does not start with `{` or does not
/// parse to a dict yields an empty map.
pub fn parse_mapping(cell: Option<&str>) -> Map<String, Value> {
    match parse_cell(cell, '{') {
        Some(Value::Object(map)) => map,
        Some(other) => {
            debug!(kind = kind_of(&other), "expected a mapping literal, using empty map");
            Map::new()
        }
        None => Map::new(),
    }
}

/// Decode a sequence cell into its string elements. Anything that does not
/// start with `[` or does not parse to a list yields an empty vec.
/// Non-string elements are skipped.
pub fn parse_sequence(cell: Option<&str>) -> Vec<String> {
    match parse_cell(cell, '[') {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                other => {
                    debug!(kind = kind_of(&other), "skipping non-string sequence element");
                    None
                }
            })
            .collect(),
        Some(other) => {
            debug!(kind = kind_of(&other), "expected a sequence literal, using empty list");
            Vec::new()
        }
        None => Vec::new(),
    }
}

fn parse_cell(cell: Option<&str>, start: char) -> Option<Value> {
    let text = cell?.trim();
    if !text.starts_with(start) {
        return None;
    }
    match parse_literal(text) {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(error = %e, "malformed literal cell");
            None
        }
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "none",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Deepest container nesting accepted before the cell is rejected.
const MAX_DEPTH: usize = 64;

struct Parser {
    chars: Vec<char>,
    pos: usize,
    /// Containers currently open.
    depth: usize,
}

impl Parser {
    fn err(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            pos: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, c: char) -> Result<(), LiteralError> {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.err(format!("expected `{c}`")))
        }
    }

    /// Run `f` one container level deeper.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, LiteralError>,
    ) -> Result<T, LiteralError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.err(format!("nesting deeper than {MAX_DEPTH}")));
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.err("unexpected end of input")),
            Some('[') => {
                self.pos += 1;
                self.nested(|p| p.items(']')).map(Value::Array)
            }
            Some('(') => {
                self.pos += 1;
                self.nested(|p| p.items(')')).map(Value::Array)
            }
            Some('{') => {
                self.pos += 1;
                self.nested(Self::braced)
            }
            Some('\'') | Some('"') => self.strings().map(Value::String),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(),
            Some(c) if c.is_alphabetic() => self.keyword(),
            Some(c) => Err(self.err(format!("unexpected character `{c}`"))),
        }
    }

    /// Comma-separated values up to `close`, trailing comma allowed.
    fn items(&mut self, close: char) -> Result<Vec<Value>, LiteralError> {
        let mut out = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(out);
            }
            out.push(self.value()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(c) if c == close => {}
                _ => return Err(self.err(format!("expected `,` or `{close}`"))),
            }
        }
    }

    /// After `{`: a dict, or a set (returned as an array).
    fn braced(&mut self) -> Result<Value, LiteralError> {
        self.skip_ws();
        if self.peek() == Some('}') {
            self.pos += 1;
            return Ok(Value::Object(Map::new()));
        }
        let first = self.value()?;
        self.skip_ws();
        if self.peek() != Some(':') {
            let mut set = vec![first];
            match self.peek() {
                Some(',') => self.pos += 1,
                Some('}') => {}
                _ => return Err(self.err("expected `,` or `}`")),
            }
            set.extend(self.items('}')?);
            return Ok(Value::Array(set));
        }

        let mut map = Map::new();
        let mut key = first;
        loop {
            self.expect(':')?;
            let val = self.value()?;
            map.insert(self.key_text(key)?, val);
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    self.skip_ws();
                    if self.peek() == Some('}') {
                        self.pos += 1;
                        return Ok(Value::Object(map));
                    }
                    key = self.value()?;
                }
                Some('}') => {
                    self.pos += 1;
                    return Ok(Value::Object(map));
                }
                _ => return Err(self.err("expected `,` or `}`")),
            }
        }
    }

    fn key_text(&self, key: Value) -> Result<String, LiteralError> {
        match key {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(if b { "True".into() } else { "False".into() }),
            Value::Null => Ok("None".into()),
            _ => Err(self.err("unhashable mapping key")),
        }
    }

    /// One or more adjacent string literals, concatenated.
    fn strings(&mut self) -> Result<String, LiteralError> {
        let mut out = self.string()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('\'') | Some('"') => out.push_str(&self.string()?),
                _ => return Ok(out),
            }
        }
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let quote = self.peek().ok_or_else(|| self.err("expected string"))?;
        self.pos += 1;
        let mut out = String::new();
        loop {
            let c = self.peek().ok_or_else(|| self.err("unterminated string"))?;
            self.pos += 1;
            match c {
                c if c == quote => return Ok(out),
                '\\' => {
                    let e = self.peek().ok_or_else(|| self.err("unterminated escape"))?;
                    self.pos += 1;
                    match e {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        '\\' | '\'' | '"' => out.push(e),
                        'x' => out.push(self.hex_escape(2)?),
                        'u' => out.push(self.hex_escape(4)?),
                        'U' => out.push(self.hex_escape(8)?),
                        '\n' => {}
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                '\n' => return Err(self.err("newline in string")),
                c => out.push(c),
            }
        }
    }

    fn hex_escape(&mut self, len: usize) -> Result<char, LiteralError> {
        let end = self.pos + len;
        if end > self.chars.len() {
            return Err(self.err("truncated escape"));
        }
        let digits: String = self.chars[self.pos..end].iter().collect();
        let code = u32::from_str_radix(&digits, 16).map_err(|_| self.err("bad hex escape"))?;
        self.pos = end;
        char::from_u32(code).ok_or_else(|| self.err("escape is not a valid char"))
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.pos += 1;
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '_'))
        {
            // exponent sign
            if matches!(self.peek(), Some('e') | Some('E'))
                && matches!(self.chars.get(self.pos + 1), Some('-') | Some('+'))
            {
                self.pos += 1;
            }
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();
        if let Ok(i) = raw.parse::<i64>() {
            return Ok(Value::Number(i.into()));
        }
        raw.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| LiteralError {
                pos: start,
                message: format!("bad number `{raw}`"),
            })
    }

    fn keyword(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "None" => Ok(Value::Null),
            _ => Err(LiteralError {
                pos: start,
                message: format!("unknown name `{word}`"),
            }),
        }
    }
}
