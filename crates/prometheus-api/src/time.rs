use std::{fmt, str::FromStr};

use thiserror::Error;

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// A point in time accepted by the upstream API.
///
/// Parses either an RFC3339 timestamp or Unix epoch seconds with an optional fractional part.
/// Both forms render to the same decimal epoch value, so equivalent inputs produce identical
/// upstream query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(jiff::Timestamp);

/// The input was neither RFC3339 nor Unix epoch seconds.
#[derive(Debug, Error)]
#[error("'{0}' is neither an RFC3339 timestamp nor Unix epoch seconds")]
pub struct InvalidTimestamp(String);

impl Timestamp {
    /// The current time.
    pub fn now() -> Self {
        Self(jiff::Timestamp::now())
    }

    /// Renders the timestamp as decimal Unix epoch seconds, without trailing fractional zeros.
    pub fn to_query_value(&self) -> String {
        let nanos = self.0.as_nanosecond();
        let sign = if nanos < 0 { "-" } else { "" };

        let nanos = nanos.unsigned_abs();
        let seconds = nanos / NANOS_PER_SECOND;
        let fraction = nanos % NANOS_PER_SECOND;

        if fraction == 0 {
            format!("{sign}{seconds}")
        } else {
            let fraction = format!("{fraction:09}");
            format!("{sign}{seconds}.{}", fraction.trim_end_matches('0'))
        }
    }

    fn from_epoch(input: &str) -> Option<Self> {
        let (negative, unsigned) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input.strip_prefix('+').unwrap_or(input)),
        };

        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) if all_digits(fraction) => (whole, fraction),
            Some(_) => return None,
            None => (unsigned, ""),
        };

        if !all_digits(whole) {
            return None;
        }

        let seconds: i64 = whole.parse().ok()?;

        // Anything finer than a nanosecond is dropped.
        let mut digits: String = fraction.chars().take(9).collect();
        while digits.len() < 9 {
            digits.push('0');
        }

        let nanos: i32 = digits.parse().ok()?;

        let (seconds, nanos) = if negative { (-seconds, -nanos) } else { (seconds, nanos) };

        jiff::Timestamp::new(seconds, nanos).ok().map(Self)
    }
}

impl FromStr for Timestamp {
    type Err = InvalidTimestamp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();

        if let Some(timestamp) = Self::from_epoch(input) {
            return Ok(timestamp);
        }

        input
            .parse::<jiff::Timestamp>()
            .map(Self)
            .map_err(|_| InvalidTimestamp(s.to_string()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
