//! Angolan taxpayer numbers (NIF).
//!
//! Companies carry a 10-digit NIF; individuals use their identity card number
//! (nine digits, two letters, three digits) as NIF. Only the shape is checked
//! here; whether the number is registered is answered by the external lookup.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors produced when parsing a NIF.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NifError {
    #[error("NIF cannot be empty")]
    Empty,
    #[error("NIF '{0}' has an invalid format")]
    InvalidFormat(String),
}

/// A syntactically valid NIF, upper-cased with separators removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Nif(String);

impl Nif {
    /// Parse a NIF, ignoring spaces, dots and dashes.
    ///
    /// # Errors
    ///
    /// Returns [`NifError`] when the input is empty or not one of the two
    /// accepted shapes.
    pub fn parse(input: &str) -> Result<Self, NifError> {
        let cleaned: String = input
            .chars()
            .filter(|c| !matches!(c, ' ' | '.' | '-'))
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if cleaned.is_empty() {
            return Err(NifError::Empty);
        }

        if is_company_nif(&cleaned) || is_personal_nif(&cleaned) {
            Ok(Self(cleaned))
        } else {
            Err(NifError::InvalidFormat(input.trim().to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a company (10-digit) NIF.
    #[must_use]
    pub fn is_company(&self) -> bool {
        is_company_nif(&self.0)
    }
}

fn is_company_nif(s: &str) -> bool {
    s.len() == 10 && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_personal_nif(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 14
        && bytes.iter().take(9).all(u8::is_ascii_digit)
        && bytes.iter().skip(9).take(2).all(u8::is_ascii_uppercase)
        && bytes.iter().skip(11).all(u8::is_ascii_digit)
}

impl fmt::Display for Nif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Nif {
    type Error = NifError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Nif> for String {
    fn from(nif: Nif) -> Self {
        nif.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_company_nif() {
        let nif = Nif::parse("5417 123 456").unwrap();
        assert_eq!(nif.as_str(), "5417123456");
        assert!(nif.is_company());
    }

    #[test]
    fn test_personal_nif() {
        let nif = Nif::parse("004848398la041").unwrap();
        assert_eq!(nif.as_str(), "004848398LA041");
        assert!(!nif.is_company());
    }

    #[test]
    fn test_invalid_nif() {
        assert_eq!(Nif::parse("  "), Err(NifError::Empty));
        assert!(matches!(Nif::parse("12345"), Err(NifError::InvalidFormat(_))));
        assert!(Nif::parse("00484839XLA041").is_err());
        assert!(Nif::parse("541712345A").is_err());
    }
}
