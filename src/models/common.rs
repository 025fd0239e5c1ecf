use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ModelError, ModelResult};

/// Largest float that still maps onto an exact integer (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Length of a lending term, in days. Fractional days are allowed (e.g. 30.5).
///
/// Always finite and strictly positive, which makes the ordering total.
#[derive(Debug, Clone, Copy)]
pub struct Term(f64);

impl Term {
    pub fn new(days: f64) -> ModelResult<Self> {
        if !days.is_finite() || days <= 0.0 {
            return Err(ModelError::invalid(
                "term",
                format!("must be a positive number of days, got {}", days),
            ));
        }
        Ok(Term(days))
    }

    pub fn days(self) -> f64 {
        self.0
    }

    /// Term length in seconds, rounded down.
    pub fn as_secs(self) -> i64 {
        (self.0 * 86_400.0).floor() as i64
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Term {}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Term {
    type Error = ModelError;

    fn try_from(days: f64) -> Result<Self, Self::Error> {
        Term::new(days)
    }
}

impl Serialize for Term {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Whole days go out as bare integers (`30`), the rest as floats (`30.5`)
        if self.0.fract() == 0.0 && self.0 < MAX_EXACT_INTEGER {
            serializer.serialize_u64(self.0 as u64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Term {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let days = f64::deserialize(deserializer)?;
        Term::new(days).map_err(de::Error::custom)
    }
}

/// Second-granular UNIX time, stored as a signed 32-bit integer.
///
/// Conversions from wider integers or from `chrono` timestamps fail instead of
/// wrapping once the value leaves the 32-bit range (January 2038).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Time(i32);

impl Time {
    pub const fn from_secs(secs: i32) -> Self {
        Time(secs)
    }

    pub fn now() -> ModelResult<Self> {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(datetime: DateTime<Utc>) -> ModelResult<Self> {
        Self::try_from(datetime.timestamp())
    }

    pub fn secs(self) -> i32 {
        self.0
    }

    pub fn to_datetime(self) -> DateTime<Utc> {
        // every i32 second count is a valid chrono timestamp
        DateTime::from_timestamp(i64::from(self.0), 0).unwrap_or_default()
    }

    pub fn checked_add_secs(self, secs: i64) -> ModelResult<Self> {
        let total = i64::from(self.0).checked_add(secs).ok_or_else(|| {
            ModelError::invalid("time", format!("{} + {} seconds overflows", self.0, secs))
        })?;
        Self::try_from(total)
    }

    /// Signed number of seconds from `self` to `later`.
    pub fn secs_until(self, later: Time) -> i64 {
        i64::from(later.0) - i64::from(self.0)
    }
}

impl From<i32> for Time {
    fn from(secs: i32) -> Self {
        Time(secs)
    }
}

impl TryFrom<i64> for Time {
    type Error = ModelError;

    fn try_from(secs: i64) -> Result<Self, Self::Error> {
        i32::try_from(secs).map(Time).map_err(|_| {
            ModelError::invalid(
                "time",
                format!("{} seconds is outside the 32-bit UNIX time range", secs),
            )
        })
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-negative decimal amount carried on the wire as a quoted string.
///
/// Any well-formed decimal string is accepted, whatever its magnitude or
/// precision, and kept verbatim so that re-encoding reproduces it exactly.
/// `value()` converts it to a [`Decimal`] for arithmetic and fails instead of
/// rounding when the amount does not fit in 28 significant digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount {
    raw: String,
}

impl Amount {
    pub fn parse(raw: impl Into<String>) -> ModelResult<Self> {
        Self::parse_field("amount", raw)
    }

    /// Checks the syntax of `raw`, reporting failures against `field`.
    pub(crate) fn parse_field(field: &'static str, raw: impl Into<String>) -> ModelResult<Self> {
        let raw = raw.into();
        if !is_plain_decimal(&raw) {
            return Err(ModelError::invalid(
                field,
                format!("'{}' is not a plain decimal number", raw),
            ));
        }

        // "-0" and "-0.00" are zero, any other minus sign is negative
        if raw.starts_with('-') && raw.bytes().any(|b| matches!(b, b'1'..=b'9')) {
            return Err(ModelError::invalid(
                field,
                format!("'{}' must not be negative", raw),
            ));
        }

        Ok(Amount { raw })
    }

    pub fn from_decimal(value: Decimal) -> ModelResult<Self> {
        Self::parse(value.to_string())
    }

    pub fn zero() -> Self {
        Amount {
            raw: "0".to_string(),
        }
    }

    /// Exact decimal value. Errors when the amount needs more than 28
    /// significant digits; it is never rounded.
    pub fn value(&self) -> ModelResult<Decimal> {
        let normalized = normalize(&self.raw);
        Decimal::from_str_exact(&normalized).map_err(|e| {
            ModelError::invalid(
                "amount",
                format!("'{}' does not fit a 28-digit decimal: {}", self.raw, e),
            )
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Canonical unsigned form of a plain decimal: no sign, no leading zeros in the
/// whole part, no trailing zeros in the fraction.
fn normalize(raw: &str) -> String {
    let unsigned = raw.trim_start_matches(['-', '+']);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let whole = whole.trim_start_matches('0');
    let fraction = fraction.trim_end_matches('0');

    let whole = if whole.is_empty() { "0" } else { whole };
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Accepts `[+-]digits[.digits]` and nothing else: no exponents, separators or
/// surrounding whitespace.
fn is_plain_decimal(raw: &str) -> bool {
    let unsigned = raw
        .strip_prefix('-')
        .or_else(|| raw.strip_prefix('+'))
        .unwrap_or(raw);

    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    match fraction {
        Some(fraction) => {
            digits(whole) && digits(fraction) && !(whole.is_empty() && fraction.is_empty())
        }
        None => !whole.is_empty() && digits(whole),
    }
}

impl TryFrom<String> for Amount {
    type Error = ModelError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Amount::parse(raw)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.raw
    }
}

impl FromStr for Amount {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
