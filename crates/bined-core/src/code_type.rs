#![forbid(unsafe_code)]

//! Numeric code representations of a byte.
//!
//! Each [`CodeType`] shows a byte as a fixed number of digits. The caret's
//! code offset addresses one of those digits, and [`CodeType::set_code_value`]
//! rewrites a single digit in place.

use std::fmt;

/// Numeric representation used by the code matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CodeType {
    /// Base 2, eight digits.
    Binary,
    /// Base 8, three digits.
    Octal,
    /// Base 10, three digits.
    Decimal,
    /// Base 16, two digits.
    #[default]
    Hexadecimal,
}

/// Letter case of hexadecimal digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CodeCharactersCase {
    Lower,
    #[default]
    Upper,
}

/// A code string that does not denote a byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeParseError {
    /// Offending token.
    pub token: String,
    pub code_type: CodeType,
}

impl fmt::Display for CodeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} code '{}'", self.code_type.name(), self.token)
    }
}

impl std::error::Error for CodeParseError {}

impl CodeType {
    /// Lowercase name, as used in configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Octal => "octal",
            Self::Decimal => "decimal",
            Self::Hexadecimal => "hexadecimal",
        }
    }

    #[must_use]
    pub const fn base(self) -> u32 {
        match self {
            Self::Binary => 2,
            Self::Octal => 8,
            Self::Decimal => 10,
            Self::Hexadecimal => 16,
        }
    }

    /// Digits needed to show one byte.
    #[must_use]
    pub const fn max_digits_for_byte(self) -> u32 {
        match self {
            Self::Binary => 8,
            Self::Octal | Self::Decimal => 3,
            Self::Hexadecimal => 2,
        }
    }

    /// Whether typing `key` at digit `code_offset` is accepted.
    ///
    /// The leading digit of octal and decimal codes is limited so that the
    /// byte cannot exceed 255 (`377` and `255`).
    #[must_use]
    pub fn is_valid_code_key_value(self, key: char, code_offset: u32) -> bool {
        match self {
            Self::Binary => matches!(key, '0' | '1'),
            Self::Decimal => {
                if code_offset == 0 {
                    matches!(key, '0'..='2')
                } else {
                    key.is_ascii_digit()
                }
            }
            Self::Octal => {
                if code_offset == 0 {
                    matches!(key, '0'..='3')
                } else {
                    matches!(key, '0'..='7')
                }
            }
            Self::Hexadecimal => key.is_ascii_hexdigit(),
        }
    }

    /// Numeric value of a typed digit key in this code's base.
    #[must_use]
    pub fn digit_value(self, key: char) -> Option<u8> {
        key.to_digit(self.base()).map(|d| d as u8)
    }

    /// Replace the digit at `code_offset` of `byte` with `value`.
    #[must_use]
    pub fn set_code_value(self, byte: u8, value: u8, code_offset: u32) -> u8 {
        match self {
            Self::Binary => {
                let shift = 7 - code_offset.min(7);
                let mask = 1u8 << shift;
                (byte & !mask) | ((value & 1) << shift)
            }
            Self::Decimal => {
                let current = u32::from(byte);
                let value = u32::from(value);
                let updated = match code_offset {
                    0 => {
                        let v = current % 100 + value * 100;
                        if v > 255 { 200 } else { v }
                    }
                    1 => {
                        let v = current / 100 * 100 + value * 10 + current % 10;
                        if v > 255 { v - 200 } else { v }
                    }
                    _ => {
                        let v = current / 10 * 10 + value;
                        if v > 255 { v - 200 } else { v }
                    }
                };
                updated as u8
            }
            Self::Octal => {
                let current = u32::from(byte);
                let value = u32::from(value);
                let updated = match code_offset {
                    0 => current % 64 + value * 64,
                    1 => current / 64 * 64 + value * 8 + current % 8,
                    _ => current / 8 * 8 + value,
                };
                (updated & 0xff) as u8
            }
            Self::Hexadecimal => {
                if code_offset == 1 {
                    (byte & 0xf0) | (value & 0x0f)
                } else {
                    (byte & 0x0f) | ((value & 0x0f) << 4)
                }
            }
        }
    }

    /// Render a byte as zero-padded digits.
    #[must_use]
    pub fn format_byte(self, byte: u8, case: CodeCharactersCase) -> String {
        let digits = self.max_digits_for_byte() as usize;
        match (self, case) {
            (Self::Binary, _) => format!("{byte:0digits$b}"),
            (Self::Octal, _) => format!("{byte:0digits$o}"),
            (Self::Decimal, _) => format!("{byte:0digits$}"),
            (Self::Hexadecimal, CodeCharactersCase::Upper) => format!("{byte:0digits$X}"),
            (Self::Hexadecimal, CodeCharactersCase::Lower) => format!("{byte:0digits$x}"),
        }
    }

    /// Render bytes as codes separated by single spaces.
    #[must_use]
    pub fn format_bytes(self, bytes: &[u8], case: CodeCharactersCase) -> String {
        let mut out = String::with_capacity(bytes.len() * (self.max_digits_for_byte() as usize + 1));
        for (i, byte) in bytes.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&self.format_byte(*byte, case));
        }
        out
    }

    /// Parse a single code token.
    pub fn parse_byte(self, token: &str) -> Result<u8, CodeParseError> {
        u32::from_str_radix(token, self.base())
            .ok()
            .and_then(|v| u8::try_from(v).ok())
            .ok_or_else(|| CodeParseError {
                token: token.to_string(),
                code_type: self,
            })
    }

    /// Parse code text into bytes.
    ///
    /// Tokens are separated by spaces, tabs, `,`, `;` or `:`; a run of digits
    /// longer than one byte is split every [`max_digits_for_byte`] characters.
    ///
    /// [`max_digits_for_byte`]: Self::max_digits_for_byte
    pub fn parse_bytes(self, text: &str) -> Result<Vec<u8>, CodeParseError> {
        let digits = self.max_digits_for_byte() as usize;
        let mut out = Vec::new();
        for token in text
            .split([' ', '\t', ',', ';', ':', '\n', '\r'])
            .filter(|t| !t.is_empty())
        {
            let chars: Vec<char> = token.chars().collect();
            for chunk in chars.chunks(digits) {
                let part: String = chunk.iter().collect();
                out.push(self.parse_byte(&part)?);
            }
        }
        Ok(out)
    }
}

impl fmt::Display for CodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
