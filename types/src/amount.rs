//! Fixed-point ledger amounts.
//!
//! Horizon reports amounts as decimal strings with up to seven fractional
//! digits (`"12.5000000"`). They are parsed into whole stroops so that
//! threshold comparisons never touch floating point.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// Number of stroops in one whole unit.
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

/// Number of fractional digits carried by classic amounts.
pub const DECIMALS: usize = 7;

/// An amount in stroops (1 unit = 10^7 stroops).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Stroops(i64);

impl Stroops {
    pub const ZERO: Self = Self(0);

    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse a Horizon decimal string. Returns `None` on anything malformed,
    /// including more than seven fractional digits or overflow.
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl FromStr for Stroops {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypesError::InvalidAmount(s.to_string());

        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, frac) = match body.split_once('.') {
            Some((w, f)) => (w, f),
            None => (body, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > DECIMALS
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut frac_value: i64 = if frac.is_empty() {
            0
        } else {
            frac.parse().map_err(|_| invalid())?
        };
        for _ in frac.len()..DECIMALS {
            frac_value *= 10;
        }

        let raw = whole
            .checked_mul(STROOPS_PER_UNIT)
            .and_then(|w| w.checked_add(frac_value))
            .ok_or_else(invalid)?;
        Ok(Self(if negative { -raw } else { raw }))
    }
}

impl fmt::Display for Stroops {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let unit = STROOPS_PER_UNIT as u64;
        write!(f, "{sign}{}.{:07}", abs / unit, abs % unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_horizon_amounts() {
        assert_eq!(Stroops::parse("0.0500000"), Some(Stroops::new(500_000)));
        assert_eq!(Stroops::parse("0.1"), Some(Stroops::new(1_000_000)));
        assert_eq!(Stroops::parse("12"), Some(Stroops::new(120_000_000)));
        assert_eq!(Stroops::parse(".5"), Some(Stroops::new(5_000_000)));
        assert_eq!(Stroops::parse("-3.0000001"), Some(Stroops::new(-30_000_001)));
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert_eq!(Stroops::parse(""), None);
        assert_eq!(Stroops::parse("."), None);
        assert_eq!(Stroops::parse("1.00000001"), None);
        assert_eq!(Stroops::parse("1e5"), None);
        assert_eq!(Stroops::parse("abc"), None);
        assert_eq!(Stroops::parse("99999999999999999999"), None);
    }

    #[test]
    fn display_pads_fraction() {
        assert_eq!(Stroops::new(500_000).to_string(), "0.0500000");
        assert_eq!(Stroops::new(-120_000_000).to_string(), "-12.0000000");
    }
}
