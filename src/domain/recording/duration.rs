//! Recording length limits written as `1h`, `90s` or `1h30m`

use std::fmt;
use std::str::FromStr;

use crate::domain::error::DurationParseError;

/// Units accepted in a limit, largest first
const UNITS: [(char, u64); 3] = [('h', 3600), ('m', 60), ('s', 1)];

/// A positive whole-second length of time.
///
/// Parsed from unit-suffixed components in descending order, each unit at
/// most once: `45s`, `2m30s`, `1h 15m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    secs: u64,
}

impl Duration {
    pub const fn from_secs(secs: u64) -> Self {
        Self { secs }
    }

    pub const fn as_secs(&self) -> u64 {
        self.secs
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DurationParseError {
            input: s.to_string(),
        };

        let mut rest = s.trim();
        let mut next_unit = 0;
        let mut total: u64 = 0;

        while !rest.is_empty() {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).ok_or_else(invalid)?;
            if digits == 0 {
                return Err(invalid());
            }
            let amount: u64 = rest[..digits].parse().map_err(|_| invalid())?;

            let unit = rest[digits..]
                .chars()
                .next()
                .map(|c| c.to_ascii_lowercase())
                .ok_or_else(invalid)?;
            // Units must appear largest first, so "30s1m" and "1m1m" fail
            let offset = UNITS[next_unit..]
                .iter()
                .position(|(u, _)| *u == unit)
                .ok_or_else(invalid)?;
            let scale = UNITS[next_unit + offset].1;
            next_unit += offset + 1;

            total = amount
                .checked_mul(scale)
                .and_then(|secs| total.checked_add(secs))
                .ok_or_else(invalid)?;
            rest = rest[digits + unit.len_utf8()..].trim_start();
        }

        if total == 0 {
            return Err(invalid());
        }
        Ok(Self { secs: total })
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.secs == 0 {
            return write!(f, "0s");
        }
        let mut left = self.secs;
        for (unit, scale) in UNITS {
            let amount = left / scale;
            if amount > 0 {
                write!(f, "{}{}", amount, unit)?;
            }
            left %= scale;
        }
        Ok(())
    }
}
