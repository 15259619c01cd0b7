// 📅 Period Keys - Time Buckets
// Maps a transaction date to the label of the bucket it is totalled under

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

// ============================================================================
// GRANULARITY
// ============================================================================

/// Time-bucketing resolution for period totals.
///
/// Weekly and biweekly buckets are cut at fixed days of the month, not ISO
/// weeks: a week never spans two months and the last one absorbs days 29-31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// No bucketing, the record's own date text is the key
    Real,
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

impl Granularity {
    pub const ALL: [Granularity; 6] = [
        Granularity::Real,
        Granularity::Daily,
        Granularity::Weekly,
        Granularity::Biweekly,
        Granularity::Monthly,
        Granularity::Yearly,
    ];

    /// Name used as the JSON key and CSV column prefix
    pub fn name(&self) -> &'static str {
        match self {
            Granularity::Real => "Real",
            Granularity::Daily => "Daily",
            Granularity::Weekly => "Weekly",
            Granularity::Biweekly => "Biweekly",
            Granularity::Monthly => "Monthly",
            Granularity::Yearly => "Yearly",
        }
    }

    /// Derive the bucket label for `date`.
    ///
    /// `original` is the date exactly as it appeared in the record and is only
    /// used by [`Granularity::Real`].
    pub fn period_key(&self, date: NaiveDate, original: &str) -> String {
        let (year, month, day) = (date.year(), date.month(), date.day());

        match self {
            Granularity::Real => original.to_string(),
            Granularity::Daily => format!("{:04}-{:02}-{:02}", year, month, day),
            Granularity::Weekly => {
                let (first, last) = match day {
                    1..=7 => (1, 7),
                    8..=14 => (8, 14),
                    15..=21 => (15, 21),
                    _ => (22, days_in_month(year, month)),
                };
                span_key(year, month, first, last)
            }
            Granularity::Biweekly => {
                let (first, last) = if day <= 14 {
                    (1, 14)
                } else {
                    (15, days_in_month(year, month))
                };
                span_key(year, month, first, last)
            }
            Granularity::Monthly => format!("{:04}-{:02}", year, month),
            Granularity::Yearly => format!("{:04}", year),
        }
    }
}

impl Default for Granularity {
    fn default() -> Self {
        Granularity::Monthly
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Granularity {
    type Err = ConfigError;

    /// Case-insensitive; `None` is accepted as an alias of `Real`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.eq_ignore_ascii_case("none") {
            return Ok(Granularity::Real);
        }

        Granularity::ALL
            .into_iter()
            .find(|g| g.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownGranularity(s.to_string()))
    }
}

// ============================================================================
// CALENDAR HELPERS
// ============================================================================

/// Number of days in the given month, leap-year aware
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        2 => 28,
        _ => 31,
    }
}

fn span_key(year: i32, month: u32, first: u32, last: u32) -> String {
    format!(
        "{:04}-{:02}-{:02} to {:04}-{:02}-{:02}",
        year, month, first, year, month, last
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn key(g: Granularity, y: i32, m: u32, d: u32) -> String {
        g.period_key(date(y, m, d), "raw")
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 1), 31);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
    }

    #[test]
    fn test_real_passes_original_text_through() {
        assert_eq!(
            Granularity::Real.period_key(date(2024, 1, 5), "01/05/2024"),
            "01/05/2024"
        );
    }

    #[test]
    fn test_daily_monthly_yearly() {
        assert_eq!(key(Granularity::Daily, 2024, 3, 9), "2024-03-09");
        assert_eq!(key(Granularity::Monthly, 2024, 3, 9), "2024-03");
        assert_eq!(key(Granularity::Yearly, 2024, 3, 9), "2024");
    }

    #[test]
    fn test_weekly_cut_points() {
        let w = Granularity::Weekly;
        assert_eq!(key(w, 2024, 1, 1), "2024-01-01 to 2024-01-07");
        assert_eq!(key(w, 2024, 1, 7), "2024-01-01 to 2024-01-07");
        assert_eq!(key(w, 2024, 1, 8), "2024-01-08 to 2024-01-14");
        assert_eq!(key(w, 2024, 1, 21), "2024-01-15 to 2024-01-21");
        assert_eq!(key(w, 2024, 1, 22), "2024-01-22 to 2024-01-31");
        assert_eq!(key(w, 2024, 1, 31), "2024-01-22 to 2024-01-31");
        assert_ne!(key(w, 2024, 1, 7), key(w, 2024, 1, 8));
    }

    #[test]
    fn test_weekly_short_february() {
        let w = Granularity::Weekly;
        assert_eq!(key(w, 2023, 2, 22), "2023-02-22 to 2023-02-28");
        assert_eq!(key(w, 2023, 2, 22), key(w, 2023, 2, 28));
        assert_eq!(key(w, 2024, 2, 29), "2024-02-22 to 2024-02-29");
    }

    #[test]
    fn test_biweekly_cut_points() {
        let b = Granularity::Biweekly;
        assert_eq!(key(b, 2024, 4, 14), "2024-04-01 to 2024-04-14");
        assert_eq!(key(b, 2024, 4, 15), "2024-04-15 to 2024-04-30");
        assert_eq!(key(b, 2023, 2, 28), "2023-02-15 to 2023-02-28");
    }

    #[test]
    fn test_parse_granularity() {
        assert_eq!("monthly".parse::<Granularity>(), Ok(Granularity::Monthly));
        assert_eq!("WEEKLY".parse::<Granularity>(), Ok(Granularity::Weekly));
        assert_eq!("None".parse::<Granularity>(), Ok(Granularity::Real));
        assert_eq!("real".parse::<Granularity>(), Ok(Granularity::Real));
        assert_eq!(
            "hourly".parse::<Granularity>(),
            Err(ConfigError::UnknownGranularity("hourly".to_string()))
        );
    }
}
