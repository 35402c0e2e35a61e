//! Domain name validation.
//!
//! Candidates typed into the storefront's domain search are checked against a
//! single-label pattern: one label of 3-63 characters (letters, digits and
//! inner hyphens) followed by an alphabetic extension. Multi-part extensions
//! such as `.co.ao` are handled by [`DomainName::split_extension`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static DOMAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9-]{1,61}[a-zA-Z0-9]\.[a-zA-Z]{2,}$")
        .unwrap_or_else(|e| unreachable!("domain pattern is a valid regex: {e}"))
});

/// Second-level zones sold under `.ao`.
const ANGOLAN_ZONES: &[&str] = &["co.ao", "it.ao", "og.ao", "ed.ao", "gv.ao", "pb.ao"];

/// Errors produced when validating a domain candidate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainNameError {
    /// The input was empty after trimming.
    #[error("domain name cannot be empty")]
    Empty,
    /// The input does not match the accepted pattern.
    #[error("'{0}' is not a valid domain name")]
    Invalid(String),
}

/// A validated, lower-cased domain name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

impl DomainName {
    /// Validate a candidate.
    ///
    /// Second-level Angolan zones (`example.co.ao`) are accepted by checking
    /// the label against the zone's first component.
    ///
    /// # Errors
    ///
    /// Returns [`DomainNameError`] when the candidate is empty or malformed.
    pub fn parse(candidate: &str) -> Result<Self, DomainNameError> {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return Err(DomainNameError::Empty);
        }

        let lowered = trimmed.to_lowercase();
        let matches = match ANGOLAN_ZONES
            .iter()
            .find_map(|zone| lowered.strip_suffix(zone).and_then(|l| l.strip_suffix('.')))
        {
            // `example.co.ao` validates as `example.co`
            Some(label) => is_valid_domain(&format!("{label}.co")),
            None => is_valid_domain(&lowered),
        };

        if matches {
            Ok(Self(lowered))
        } else {
            Err(DomainNameError::Invalid(trimmed.to_string()))
        }
    }

    /// Combine a bare label and an extension (with or without leading dot).
    ///
    /// # Errors
    ///
    /// Returns [`DomainNameError`] when the combination is not a valid name.
    pub fn from_parts(label: &str, extension: &str) -> Result<Self, DomainNameError> {
        let extension = extension.trim().trim_start_matches('.');
        Self::parse(&format!("{}.{extension}", label.trim()))
    }

    /// The full name, e.g. `angohost.co.ao`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into label and extension (extension keeps its leading dot).
    ///
    /// ```
    /// use angohost_core::DomainName;
    ///
    /// let name = DomainName::parse("loja.co.ao").unwrap();
    /// assert_eq!(name.split_extension(), ("loja", ".co.ao"));
    /// ```
    #[must_use]
    pub fn split_extension(&self) -> (&str, &str) {
        for zone in ANGOLAN_ZONES {
            if let Some(label) = self.0.strip_suffix(zone).and_then(|l| l.strip_suffix('.')) {
                return (label, &self.0[label.len()..]);
            }
        }
        self.0
            .split_once('.')
            .map_or((self.0.as_str(), ""), |(label, _)| (label, &self.0[label.len()..]))
    }
}

/// Check a candidate against the storefront's domain pattern without
/// normalizing it first.
#[must_use]
pub fn is_valid_domain(candidate: &str) -> bool {
    DOMAIN_PATTERN.is_match(candidate)
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DomainName {
    type Error = DomainNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DomainName> for String {
    fn from(name: DomainName) -> Self {
        name.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_accepts_simple_domains() {
        assert!(is_valid_domain("angohost.ao"));
        assert!(is_valid_domain("minha-loja.com"));
        assert!(is_valid_domain("abc.net"));
        assert!(is_valid_domain("Loja24.AO"));
    }

    #[test]
    fn test_pattern_rejects_malformed_domains() {
        assert!(!is_valid_domain("a..com"));
        assert!(!is_valid_domain("-bad-.com"));
        assert!(!is_valid_domain("ab.com"));
        assert!(!is_valid_domain("loja.c"));
        assert!(!is_valid_domain("loja.a0"));
        assert!(!is_valid_domain("loja"));
    }

    #[test]
    fn test_parse_lowercases_and_trims() {
        let name = DomainName::parse("  AngoHost.AO ").unwrap();
        assert_eq!(name.as_str(), "angohost.ao");
    }

    #[test]
    fn test_parse_accepts_angolan_second_level_zones() {
        assert!(DomainName::parse("empresa.co.ao").is_ok());
        assert!(DomainName::parse("escola.ed.ao").is_ok());
        assert!(DomainName::parse("-x-.co.ao").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(DomainName::parse(""), Err(DomainNameError::Empty));
        assert!(matches!(
            DomainName::parse("a..com"),
            Err(DomainNameError::Invalid(_))
        ));
    }

    #[test]
    fn test_from_parts_accepts_dotted_and_bare_extensions() {
        assert_eq!(
            DomainName::from_parts("loja", ".ao").unwrap().as_str(),
            "loja.ao"
        );
        assert_eq!(
            DomainName::from_parts("loja", "co.ao").unwrap().as_str(),
            "loja.co.ao"
        );
    }

    #[test]
    fn test_split_extension() {
        let name = DomainName::parse("angohost.ao").unwrap();
        assert_eq!(name.split_extension(), ("angohost", ".ao"));
        let name = DomainName::parse("angohost.co.ao").unwrap();
        assert_eq!(name.split_extension(), ("angohost", ".co.ao"));
    }
}
