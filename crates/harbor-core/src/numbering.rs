//! # Document Numbers
//!
//! Human-readable numbers for orders (`SO…`) and inventory checks (`CHK…`).
//!
//! ## Format
//! ```text
//!   SO  20261016120000  123
//!   ──  ──────────────  ───
//!   │         │          └── suffix, uniformly random in 100..=999
//!   │         └── local wall-clock time, YYYYMMDDHHMMSS
//!   └── prefix
//! ```
//!
//! Numbers are not guaranteed unique on their own: two documents created in
//! the same second can draw the same suffix. The database enforces uniqueness
//! and the caller asks for a fresh number a bounded number of times.

use chrono::{DateTime, TimeZone};
use rand::Rng;
use std::fmt::Display;

/// Prefix of order numbers.
pub const ORDER_PREFIX: &str = "SO";

/// Prefix of inventory check numbers.
pub const CHECK_PREFIX: &str = "CHK";

/// Smallest suffix value (always three digits).
pub const SUFFIX_MIN: u16 = 100;

/// Largest suffix value.
pub const SUFFIX_MAX: u16 = 999;

/// Generator of candidate document numbers.
///
/// Production uses [`ClockNumbers`]; tests inject scripted sequences to force
/// collisions.
pub trait NumberSource: Send + Sync + std::fmt::Debug {
    /// Next candidate number for `prefix`.
    fn next_number(&self, prefix: &str) -> String;
}

/// Local time plus a random 3-digit suffix.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClockNumbers;

impl NumberSource for ClockNumbers {
    fn next_number(&self, prefix: &str) -> String {
        document_number(prefix, &chrono::Local::now(), random_suffix())
    }
}

/// Uniformly random suffix in `SUFFIX_MIN..=SUFFIX_MAX`.
pub fn random_suffix() -> u16 {
    rand::thread_rng().gen_range(SUFFIX_MIN..=SUFFIX_MAX)
}

/// Builds a document number from a prefix, a timestamp and a suffix.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use harbor_core::numbering::document_number;
///
/// let at = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
/// assert_eq!(document_number("SO", &at, 123), "SO20261016120000123");
/// ```
pub fn document_number<Tz>(prefix: &str, at: &DateTime<Tz>, suffix: u16) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{}{}{:03}", prefix, at.format("%Y%m%d%H%M%S"), suffix)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_document_number_layout() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(document_number(CHECK_PREFIX, &at, 100), "CHK20260102030405100");
        assert_eq!(document_number(ORDER_PREFIX, &at, 999), "SO20260102030405999");
    }

    #[test]
    fn test_random_suffix_stays_in_range() {
        for _ in 0..1000 {
            let suffix = random_suffix();
            assert!((SUFFIX_MIN..=SUFFIX_MAX).contains(&suffix));
        }
    }

    #[test]
    fn test_clock_number_shape() {
        let number = ClockNumbers.next_number(ORDER_PREFIX);
        assert!(number.starts_with("SO"));
        assert_eq!(number.len(), 2 + 14 + 3);
        assert!(number[2..].chars().all(|c| c.is_ascii_digit()));
    }
}
