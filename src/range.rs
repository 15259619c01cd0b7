// 🗓️ Date Range Filter
// Inclusive [start, end] window, either bound optional

use chrono::NaiveDate;

use crate::error::ConfigError;

/// Optional inclusive window on naive calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Unbounded range, accepts every date
    pub fn all() -> Self {
        DateRange::default()
    }

    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, ConfigError> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(ConfigError::InvertedRange {
                    start: s.to_string(),
                    end: e.to_string(),
                });
            }
        }
        Ok(DateRange { start, end })
    }

    /// Parse bounds with the same format used for record dates
    pub fn parse(start: Option<&str>, end: Option<&str>, format: &str) -> Result<Self, ConfigError> {
        let start = start.map(|s| parse_bound("start", s, format)).transpose()?;
        let end = end.map(|s| parse_bound("end", s, format)).transpose()?;
        DateRange::new(start, end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

fn parse_bound(which: &'static str, value: &str, format: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), format).map_err(|_| ConfigError::InvalidBound {
        which,
        value: value.to_string(),
        format: format.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_unbounded_accepts_everything() {
        let range = DateRange::all();
        assert!(range.is_unbounded());
        assert!(range.contains(date(1970, 1, 1)));
        assert!(range.contains(date(2999, 12, 31)));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let range = DateRange::new(Some(date(2024, 1, 10)), Some(date(2024, 1, 20))).unwrap();

        assert!(range.contains(date(2024, 1, 10)));
        assert!(range.contains(date(2024, 1, 20)));
        assert!(range.contains(date(2024, 1, 15)));
        assert!(!range.contains(date(2024, 1, 9)));
        assert!(!range.contains(date(2024, 1, 21)));
    }

    #[test]
    fn test_single_bound() {
        let from = DateRange::new(Some(date(2024, 1, 10)), None).unwrap();
        assert!(from.contains(date(2030, 1, 1)));
        assert!(!from.contains(date(2024, 1, 9)));

        let until = DateRange::new(None, Some(date(2024, 1, 10))).unwrap();
        assert!(until.contains(date(1999, 1, 1)));
        assert!(!until.contains(date(2024, 1, 11)));
    }

    #[test]
    fn test_parse_with_record_format() {
        let range = DateRange::parse(Some("01/10/2024"), Some("02/01/2024"), "%m/%d/%Y").unwrap();
        assert_eq!(range.start, Some(date(2024, 1, 10)));
        assert_eq!(range.end, Some(date(2024, 2, 1)));
    }

    #[test]
    fn test_parse_rejects_bad_bound() {
        let err = DateRange::parse(Some("2024-01-10"), None, "%m/%d/%Y").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBound { which: "start", .. }));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = DateRange::new(Some(date(2024, 2, 1)), Some(date(2024, 1, 1))).unwrap_err();
        assert!(matches!(err, ConfigError::InvertedRange { .. }));
    }
}
