use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Requested amount as entered, before any validation.
///
/// Holds the submitted number unchanged. Negative and fractional requests are
/// representable so that they can be recorded in the ledger exactly as they
/// were submitted; only the engine decides whether the amount is usable.
///
/// Comparison uses the IEEE total order, so `Amount` can be `Eq` and `Ord`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Amount(f64);

/// Error returned when text cannot be read as an [`Amount`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseAmountError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("'{0}' is out of range")]
    OutOfRange(String),
}

impl Amount {
    /// Magnitude from which a float no longer holds every integer exactly.
    const MAX_WHOLE: f64 = 9_007_199_254_740_992.0;

    pub fn from_float(value: f64) -> Self {
        Amount(value)
    }

    pub fn from_whole(value: i64) -> Self {
        Amount(value as f64)
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0.0
    }

    /// The amount in whole currency units, or `None` if it has a fractional
    /// part, however small.
    pub fn whole(self) -> Option<i64> {
        (self.0.is_finite() && self.0.fract() == 0.0 && self.0.abs() < Self::MAX_WHOLE)
            .then_some(self.0 as i64)
    }

    pub fn to_f64(self) -> f64 {
        self.0
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Amount {}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Amount {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| ParseAmountError::NotANumber(trimmed.to_string()))?;

        // `f64::from_str` accepts "nan" and "inf"
        if !value.is_finite() {
            return Err(ParseAmountError::NotANumber(trimmed.to_string()));
        }
        if value.abs() >= Self::MAX_WHOLE {
            return Err(ParseAmountError::OutOfRange(trimmed.to_string()));
        }

        Ok(Amount(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.whole() {
            Some(whole) => write!(f, "{whole}"),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Whole amounts are written as JSON integers, fractional ones as floats.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.whole() {
            Some(whole) => serializer.serialize_i64(whole),
            None => serializer.serialize_f64(self.0),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Amount)
    }
}
