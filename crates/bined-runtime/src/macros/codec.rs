#![forbid(unsafe_code)]

//! Textual form of macro steps.
//!
//! A step is stored as its operation code, optionally followed by a
//! parenthesized, comma separated parameter list:
//!
//! ```text
//! selection-clear
//! caret-move(RIGHT,3)
//! key-press("a\"b\u00E9")
//! search-find-text("needle",1)
//! ```
//!
//! Text parameters are double quoted. `\n`, `\r`, `\t`, `\"` and `\\` are
//! escaped, and every character at or above U+0080 is written as `\uXXXX`
//! UTF-16 units (a surrogate pair for characters outside the BMP). Integers
//! are plain decimal digits; directions are their canonical names.
//!
//! Positions in [`MacroParseError`] are byte offsets into the step text.

use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

use bined_core::MovementDirection;

use super::step::{MacroOperation, MacroParameter, MacroStep};

/// A step text that cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroParseError {
    pub message: String,
    pub position: usize,
}

impl MacroParseError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for MacroParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.message, self.position)
    }
}

impl std::error::Error for MacroParseError {}

// ============================================================================
// Encoding
// ============================================================================

/// Encode a step with its parameters.
#[must_use]
pub fn encode_step(step: MacroStep, parameters: &[MacroParameter]) -> String {
    let mut out = String::from(step.operation_code());
    if parameters.is_empty() {
        return out;
    }
    out.push('(');
    for (i, parameter) in parameters.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        match parameter {
            MacroParameter::Text(text) => encode_text(&mut out, text),
            MacroParameter::Integer(value) => {
                let _ = write!(out, "{value}");
            }
            MacroParameter::Direction(direction) => out.push_str(direction.name()),
        }
    }
    out.push(')');
    out
}

fn encode_text(out: &mut String, text: &str) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if u32::from(c) >= 0x80 => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{unit:04X}");
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode a step text.
pub fn parse_step(text: &str) -> Result<MacroOperation, MacroParseError> {
    let (code, parameters) = match text.find('(') {
        None => (text, Vec::new()),
        Some(open) => (
            &text[..open],
            Parser::new(text, open + 1).parse_parameters()?,
        ),
    };
    let step = MacroStep::find_by_code(code)
        .ok_or_else(|| MacroParseError::new(format!("Unknown operation: {code}"), 0))?;
    Ok(MacroOperation::with_parameters(step, parameters))
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    const fn new(text: &'a str, pos: usize) -> Self {
        Self { text, pos }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn missing_close(&self) -> MacroParseError {
        MacroParseError::new("Missing close bracket", self.text.len().saturating_sub(1))
    }

    fn parse_parameters(mut self) -> Result<Vec<MacroParameter>, MacroParseError> {
        let mut parameters = Vec::new();
        loop {
            let parameter = match self.peek() {
                None => return Err(self.missing_close()),
                Some('"') => self.parse_text()?,
                Some(_) => self.parse_token()?,
            };
            parameters.push(parameter);
            match self.bump() {
                Some(',') => {}
                Some(')') => break,
                None => return Err(self.missing_close()),
                Some(c) => {
                    return Err(MacroParseError::new(
                        "Unexpected character",
                        self.pos - c.len_utf8(),
                    ));
                }
            }
        }
        if self.pos < self.text.len() {
            return Err(MacroParseError::new("Unexpected character", self.pos));
        }
        Ok(parameters)
    }

    fn parse_text(&mut self) -> Result<MacroParameter, MacroParseError> {
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(self.missing_close()),
                Some('"') => return Ok(MacroParameter::Text(value)),
                Some('\\') => value.push(self.parse_escape()?),
                Some(c) => value.push(c),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, MacroParseError> {
        let at = self.pos;
        let Some(escaped) = self.bump() else {
            return Err(MacroParseError::new(
                "Missing escaped character",
                self.text.len().saturating_sub(1),
            ));
        };
        match escaped {
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            '"' => Ok('"'),
            '\\' => Ok('\\'),
            'u' => self.parse_unicode(at),
            _ => Err(MacroParseError::new("Unsupported escaped character", at)),
        }
    }

    /// Four hex digits after `\u`, plus the low half of a surrogate pair.
    fn parse_unicode(&mut self, at: usize) -> Result<char, MacroParseError> {
        let high = self.hex_unit(at)?;
        let code = if (0xd800..0xdc00).contains(&high) {
            if !self.text[self.pos..].starts_with("\\u") {
                return Err(MacroParseError::new("Invalid unicode escape sequence", at));
            }
            self.pos += 2;
            let low = self.hex_unit(at)?;
            if !(0xdc00..0xe000).contains(&low) {
                return Err(MacroParseError::new("Invalid unicode escape sequence", at));
            }
            0x10000 + ((high - 0xd800) << 10) + (low - 0xdc00)
        } else {
            high
        };
        char::from_u32(code).ok_or_else(|| MacroParseError::new("Invalid unicode escape sequence", at))
    }

    fn hex_unit(&mut self, at: usize) -> Result<u32, MacroParseError> {
        let digits = self
            .text
            .get(self.pos..self.pos + 4)
            .filter(|d| d.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| MacroParseError::new("Incomplete unicode escape sequence", at))?;
        let unit = u32::from_str_radix(digits, 16)
            .map_err(|_| MacroParseError::new("Incomplete unicode escape sequence", at))?;
        self.pos += 4;
        Ok(unit)
    }

    fn parse_token(&mut self) -> Result<MacroParameter, MacroParseError> {
        let start = self.pos;
        let rest = &self.text[start..];
        let end = rest
            .find([',', ')'])
            .ok_or_else(|| self.missing_close())?;
        let token = &rest[..end];
        self.pos = start + end;
        if token.starts_with(|c: char| c.is_ascii_digit()) {
            return token
                .parse::<u64>()
                .map(MacroParameter::Integer)
                .map_err(|_| MacroParseError::new("Invalid number", start));
        }
        MovementDirection::from_name(token)
            .map(MacroParameter::Direction)
            .ok_or_else(|| MacroParseError::new("Unknown value", start))
    }
}

impl fmt::Display for MacroOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_step(self.step, &self.parameters))
    }
}

impl FromStr for MacroOperation {
    type Err = MacroParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_step(s)
    }
}
