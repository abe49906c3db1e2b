//! Country code value objects.
//!
//! A `CountryCode` is always exactly three uppercase ASCII letters. A
//! `CountrySlot` is either a known code or the `UNKNOWN` sentinel; anything an
//! extractor produces that is not a valid code collapses to `Unknown`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Wire sentinel for an unfilled slot.
pub const UNKNOWN_SENTINEL: &str = "UNKNOWN";

/// Three-letter uppercase country code (ISO 3166-1 alpha-3 shaped).
///
/// Only the format is checked; `XYZ` is a valid code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryCode([u8; 3]);

impl CountryCode {
    /// Parses a code, uppercasing ASCII letters first.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("country_code"));
        }

        let bytes = trimmed.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(ValidationError::invalid_format(
                "country_code",
                format!("expected 3 alphabetic characters, got '{}'", trimmed),
            ));
        }

        Ok(Self([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
            bytes[2].to_ascii_uppercase(),
        ]))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // Construction guarantees ASCII letters.
        std::str::from_utf8(&self.0).unwrap_or(UNKNOWN_SENTINEL)
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CountryCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for CountryCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CountryCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(&raw).map_err(serde::de::Error::custom)
    }
}

/// One of the two intake slots: a known country or `UNKNOWN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CountrySlot {
    #[default]
    Unknown,
    Known(CountryCode),
}

impl CountrySlot {
    /// Coerces arbitrary extractor output into a slot.
    ///
    /// Anything that is not exactly three letters (including the literal
    /// `UNKNOWN`) becomes `Unknown`.
    pub fn coerce(raw: &str) -> Self {
        CountryCode::new(raw).map(Self::Known).unwrap_or(Self::Unknown)
    }

    /// Coerces an optional raw value; `None` is `Unknown`.
    pub fn coerce_opt(raw: Option<&str>) -> Self {
        raw.map(Self::coerce).unwrap_or(Self::Unknown)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn is_unknown(&self) -> bool {
        !self.is_known()
    }

    /// Returns the code if known.
    pub fn code(&self) -> Option<CountryCode> {
        match self {
            Self::Known(code) => Some(*code),
            Self::Unknown => None,
        }
    }

    /// Wire representation: the code, or `UNKNOWN`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(code) => code.as_str(),
            Self::Unknown => UNKNOWN_SENTINEL,
        }
    }
}

impl From<CountryCode> for CountrySlot {
    fn from(code: CountryCode) -> Self {
        Self::Known(code)
    }
}

impl fmt::Display for CountrySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CountrySlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CountrySlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self::coerce_opt(raw.as_deref()))
    }
}
