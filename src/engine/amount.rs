use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const FRACTION_DIGITS: usize = 2;
const SCALE: i64 = 100;

/// Amount of money held or moved by an account.
/// Stored as an i64 count of minor units (hundredths) so balances never pick up
/// floating point rounding error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    minor: i64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount parsing error: {0}")]
    Parse(String),

    #[error("Overflow error while computing Amount")]
    Overflow,

    #[error("Underflow error while computing Amount")]
    Underflow,
}

impl Amount {
    pub const ZERO: Amount = Amount { minor: 0 };

    pub fn from_minor_units(minor: i64) -> Self {
        Amount { minor }
    }

    pub fn minor_units(&self) -> i64 {
        self.minor
    }

    pub fn is_positive(&self) -> bool {
        self.minor > 0
    }

    pub fn is_negative(&self) -> bool {
        self.minor < 0
    }

    pub fn checked_add(&self, other: Amount) -> Result<Amount, AmountError> {
        self.minor
            .checked_add(other.minor)
            .map(Amount::from_minor_units)
            .ok_or(AmountError::Overflow)
    }

    pub fn checked_sub(&self, other: Amount) -> Result<Amount, AmountError> {
        self.minor
            .checked_sub(other.minor)
            .map(Amount::from_minor_units)
            .ok_or(AmountError::Underflow)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parse_err = || AmountError::Parse(s.to_owned());

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

        // Rejects "", "-", "." and anything that is not plain decimal digits.
        if whole.is_empty() && fraction.is_empty() {
            return Err(parse_err());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(parse_err());
        }
        if fraction.len() > FRACTION_DIGITS {
            return Err(parse_err());
        }

        // Only digits remain, so a failed parse can only mean the value is too large.
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| AmountError::Overflow)?
        };
        let fraction: i64 = if fraction.is_empty() {
            0
        } else {
            format!("{fraction:0<width$}", width = FRACTION_DIGITS)
                .parse()
                .map_err(|_| parse_err())?
        };

        let minor = whole
            .checked_mul(SCALE)
            .and_then(|v| v.checked_add(fraction))
            .ok_or(AmountError::Overflow)?;

        Ok(Amount::from_minor_units(if negative { -minor } else { minor }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.minor.unsigned_abs();
        let sign = if self.is_negative() { "-" } else { "" };
        write!(
            f,
            "{sign}{}.{:0width$}",
            abs / SCALE as u64,
            abs % SCALE as u64,
            width = FRACTION_DIGITS
        )
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
