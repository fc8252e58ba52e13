use std::fmt::Display;
use std::str::FromStr;

use crate::ConfigError;

/// A synchronization pattern (access code, or syncword) as a sequence of unpacked bits.
///
/// Patterns are parsed from text in one of three forms:
/// * plain binary digits, e.g., `10110100`
/// * binary digits with a `0b` prefix, e.g., `0b10110100`
/// * hexadecimal digits with a `0x` prefix, e.g., `0xb4`, where each digit expands to 4
///   bits, most-significant bit first
///
/// The empty string is the empty pattern.
///
/// ```
/// use pdu_utils::deframer::SyncPattern;
///
/// let pat: SyncPattern = "0xb4".parse().unwrap();
/// assert_eq!(pat.bits(), &[1, 0, 1, 1, 0, 1, 0, 0]);
/// assert_eq!(pat, "0b10110100".parse().unwrap());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SyncPattern(Vec<u8>);

impl SyncPattern {
    #[must_use]
    pub fn new() -> Self {
        SyncPattern(Vec::new())
    }

    /// Create a pattern from unpacked bits; only the low bit of each value is used.
    #[must_use]
    pub fn from_bits(bits: &[u8]) -> Self {
        SyncPattern(bits.iter().map(|b| b & 0x1).collect())
    }

    #[must_use]
    pub fn bits(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Concatenate `other` after this pattern.
    #[must_use]
    pub fn concat(&self, other: &SyncPattern) -> SyncPattern {
        let mut bits = Vec::with_capacity(self.len() + other.len());
        bits.extend_from_slice(&self.0);
        bits.extend_from_slice(&other.0);
        SyncPattern(bits)
    }
}

fn parse_binary(pattern: &str, digits: &str) -> Result<Vec<u8>, ConfigError> {
    digits
        .chars()
        .map(|c| match c {
            '0' => Ok(0),
            '1' => Ok(1),
            _ => Err(ConfigError::InvalidDigit {
                pattern: pattern.to_string(),
                digit: c,
            }),
        })
        .collect()
}

fn parse_hex(pattern: &str, digits: &str) -> Result<Vec<u8>, ConfigError> {
    let mut bits = Vec::with_capacity(digits.len() * 4);
    for c in digits.chars() {
        let Some(nibble) = c.to_digit(16) else {
            return Err(ConfigError::InvalidDigit {
                pattern: pattern.to_string(),
                digit: c,
            });
        };
        for i in (0..4).rev() {
            bits.push(u8::from((nibble >> i) & 0x1 == 1));
        }
    }
    Ok(bits)
}

impl FromStr for SyncPattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Ok(SyncPattern::new());
        }

        let bits = if let Some(digits) = text.strip_prefix("0x") {
            if digits.is_empty() {
                return Err(ConfigError::MissingDigits(s.to_string()));
            }
            parse_hex(s, digits)?
        } else if let Some(digits) = text.strip_prefix("0b") {
            if digits.is_empty() {
                return Err(ConfigError::MissingDigits(s.to_string()));
            }
            parse_binary(s, digits)?
        } else {
            parse_binary(s, text)?
        };

        Ok(SyncPattern(bits))
    }
}

impl TryFrom<&str> for SyncPattern {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for SyncPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in &self.0 {
            write!(f, "{b}")?;
        }
        Ok(())
    }
}
