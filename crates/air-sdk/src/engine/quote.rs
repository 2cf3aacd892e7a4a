//! Rate calculator
//!
//! All amounts are whole currency units. Percentages are applied as exact
//! integer ratios with half-up rounding, so `0.9 × 2225 = 2002.5` becomes
//! 2003 rather than whatever binary floating point would produce.

use crate::catalog::RolePreset;
use serde::Serialize;

/// Flat fee per revision round
pub const REVISION_FEE: u64 = 125;
/// Flat fee per travel day
pub const TRAVEL_FEE: u64 = 250;

/// Clamped calculator input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteInput {
    pub days: u64,
    pub revision_rounds: u64,
    pub rush: bool,
    pub travel_days: u64,
}

impl Default for QuoteInput {
    fn default() -> Self {
        Self {
            days: 1,
            revision_rounds: 0,
            rush: false,
            travel_days: 0,
        }
    }
}

impl QuoteInput {
    pub fn new(days: u64, revision_rounds: u64, rush: bool, travel_days: u64) -> Self {
        Self {
            days: days.max(1),
            revision_rounds,
            rush,
            travel_days,
        }
    }

    /// Build from raw form text. Unparseable, non-finite or negative values
    /// take the floor (1 day, 0 otherwise); fractions are truncated.
    pub fn parse(days: &str, revision_rounds: &str, rush: bool, travel_days: &str) -> Self {
        Self::new(
            clamp_count(days, 1),
            clamp_count(revision_rounds, 0),
            rush,
            clamp_count(travel_days, 0),
        )
    }
}

fn clamp_count(raw: &str, floor: u64) -> u64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.trunc())
        .filter(|v| *v >= floor as f64)
        // float-to-int casts saturate
        .map(|v| v as u64)
        .unwrap_or(floor)
}

/// Calculated quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub base: u64,
    pub rush_fee: u64,
    pub min: u64,
    pub target: u64,
    pub stretch: u64,
}

/// `value × num / den`, rounded half up. `den` must be even.
fn scale(value: u64, num: u64, den: u64) -> u64 {
    value.saturating_mul(num).saturating_add(den / 2) / den
}

pub fn quote(role: &RolePreset, input: &QuoteInput) -> Quote {
    let base = role.day_rate.saturating_mul(input.days.max(1));
    let rush_fee = if input.rush { scale(base, 2, 10) } else { 0 };

    let target = base
        .saturating_add(REVISION_FEE.saturating_mul(input.revision_rounds))
        .saturating_add(TRAVEL_FEE.saturating_mul(input.travel_days))
        .saturating_add(rush_fee);

    Quote {
        base,
        rush_fee,
        min: scale(target, 9, 10),
        target,
        stretch: scale(target, 115, 100),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::role_or_default;

    fn producer() -> RolePreset {
        role_or_default("producer")
    }

    #[test]
    fn test_producer_three_days_one_revision() {
        let q = quote(&producer(), &QuoteInput::new(3, 1, false, 0));
        assert_eq!(q.base, 2100);
        assert_eq!(q.target, 2225);
        assert_eq!(q.min, 2003);
        assert_eq!(q.stretch, 2559);
    }

    #[test]
    fn test_rush_adds_twenty_percent_of_base() {
        let q = quote(&producer(), &QuoteInput::new(3, 1, true, 0));
        assert_eq!(q.rush_fee, 420);
        assert_eq!(q.target, 2645);
    }

    #[test]
    fn test_zero_days_clamps_to_one() {
        let q = quote(&producer(), &QuoteInput::new(0, 0, false, 0));
        assert_eq!(q.base, 700);
    }

    #[test]
    fn test_parse_clamps_bad_input() {
        assert_eq!(QuoteInput::parse("", "-2", false, "abc"), QuoteInput::default());
        assert_eq!(QuoteInput::parse("0", "0", false, "0").days, 1);
        assert_eq!(QuoteInput::parse("NaN", "inf", false, "1").revision_rounds, 0);

        let input = QuoteInput::parse(" 2.9 ", "1.5", true, "3");
        assert_eq!(input, QuoteInput::new(2, 1, true, 3));
    }

    #[test]
    fn test_quote_is_monotone() {
        for role in crate::catalog::ROLE_PRESETS.iter() {
            for n in 1..6u64 {
                let a = quote(role, &QuoteInput::new(n, n, false, n));
                let more_days = quote(role, &QuoteInput::new(n + 1, n, false, n));
                let more_revisions = quote(role, &QuoteInput::new(n, n + 1, false, n));
                let more_travel = quote(role, &QuoteInput::new(n, n, false, n + 1));
                let rushed = quote(role, &QuoteInput::new(n, n, true, n));

                assert!(more_days.target > a.target);
                assert!(more_revisions.target > a.target);
                assert!(more_travel.target > a.target);
                assert!(rushed.target > a.target);
                assert!(a.min <= a.target && a.target <= a.stretch);
            }
        }
    }
}
