//! Station code types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Error returned when a station code is not a valid CRS code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station code {code:?}: {reason}")]
pub struct InvalidCrs {
    code: String,
    reason: &'static str,
}

/// A 3-letter CRS station code such as `KGX` or `PBO`.
///
/// Stored uppercase. Data from the departure source is expected to be
/// uppercase already; operator-written configuration goes through
/// [`Crs::parse_config`], which ignores case.
///
/// # Examples
///
/// ```
/// use departure_board::domain::Crs;
///
/// let kgx = Crs::parse("KGX").unwrap();
/// assert_eq!(kgx.as_str(), "KGX");
/// assert!(Crs::parse("kgx").is_err());
/// assert_eq!(Crs::parse_config(" kgx ").unwrap(), kgx);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Crs([u8; 3]);

impl Crs {
    /// Parse a CRS code that must already be 3 uppercase ASCII letters.
    pub fn parse(s: &str) -> Result<Self, InvalidCrs> {
        let invalid = |reason| InvalidCrs {
            code: s.to_string(),
            reason,
        };

        let bytes: [u8; 3] = s
            .as_bytes()
            .try_into()
            .map_err(|_| invalid("must be exactly 3 characters"))?;

        if !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(invalid("must be uppercase ASCII letters A-Z"));
        }

        Ok(Crs(bytes))
    }

    /// Parse a station code typed by an operator: surrounding whitespace is
    /// trimmed and letters are uppercased before validation.
    pub fn parse_config(s: &str) -> Result<Self, InvalidCrs> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the CRS code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII uppercase bytes are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl FromStr for Crs {
    type Err = InvalidCrs;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for Crs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Crs::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Debug for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Crs({})", self.as_str())
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_crs() {
        for code in ["KGX", "PBO", "SVG", "EDB", "BFR"] {
            assert_eq!(Crs::parse(code).unwrap().as_str(), code);
        }
    }

    #[test]
    fn reject_lowercase() {
        assert!(Crs::parse("kgx").is_err());
        assert!(Crs::parse("KGx").is_err());
    }

    #[test]
    fn reject_wrong_length() {
        assert!(Crs::parse("").is_err());
        assert!(Crs::parse("KG").is_err());
        assert!(Crs::parse("KGXX").is_err());
    }

    #[test]
    fn reject_non_letters() {
        assert!(Crs::parse("K1X").is_err());
        assert!(Crs::parse("K X").is_err());
        assert!(Crs::parse("KÖ").is_err());
    }

    #[test]
    fn config_codes_ignore_case_and_whitespace() {
        assert_eq!(Crs::parse_config("svg").unwrap(), Crs::parse("SVG").unwrap());
        assert_eq!(Crs::parse_config("  Pbo ").unwrap(), Crs::parse("PBO").unwrap());
        assert!(Crs::parse_config("s vg").is_err());
    }

    #[test]
    fn error_names_the_code() {
        let err = Crs::parse("KINGS").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid station code \"KINGS\": must be exactly 3 characters"
        );
    }

    #[test]
    fn deserialize_from_json() {
        let crs: Crs = serde_json::from_str("\"EDB\"").unwrap();
        assert_eq!(crs, Crs::parse("EDB").unwrap());
        assert!(serde_json::from_str::<Crs>("\"edinburgh\"").is_err());
    }

    #[test]
    fn display_and_debug() {
        let crs = Crs::parse("PAD").unwrap();
        assert_eq!(format!("{}", crs), "PAD");
        assert_eq!(format!("{:?}", crs), "Crs(PAD)");
    }
}
