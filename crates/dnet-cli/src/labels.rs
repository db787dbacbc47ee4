//! Calendar labels for projected periods.

use chrono::{Datelike, Months, NaiveDate};
use dnet_core::{DnetError, DnetResult};

/// Label format for a projected month, e.g. "May 24".
pub const MONTH_LABEL_FORMAT: &str = "%B %y";

/// Parse a start month given as `YYYY-MM` or `YYYY-MM-DD`; the day is dropped.
pub fn parse_start_month(value: &str) -> DnetResult<NaiveDate> {
    let trimmed = value.trim();
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d"))
        .map_err(|_| {
            DnetError::Parse(format!(
                "start month '{value}' is not in YYYY-MM or YYYY-MM-DD form"
            ))
        })?;
    date.with_day(1)
        .ok_or_else(|| DnetError::Parse(format!("start month '{value}' has no first day")))
}

/// `count` consecutive month labels beginning at `start`.
pub fn month_labels(start: NaiveDate, count: usize) -> DnetResult<Vec<String>> {
    (0..count)
        .map(|offset| {
            let months = u32::try_from(offset)
                .map_err(|_| DnetError::invalid(format!("too many periods: {count}")))?;
            start
                .checked_add_months(Months::new(months))
                .map(|date| date.format(MONTH_LABEL_FORMAT).to_string())
                .ok_or_else(|| {
                    DnetError::invalid(format!("month {offset} after {start} is out of range"))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_month_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(parse_start_month("2024-05").unwrap(), expected);
        assert_eq!(parse_start_month("2024-05-17").unwrap(), expected);
        assert!(parse_start_month("May 2024").is_err());
    }

    #[test]
    fn test_twelve_labels_cross_the_year() {
        let start = parse_start_month("2024-05").unwrap();
        let labels = month_labels(start, 12).unwrap();
        assert_eq!(labels.len(), 12);
        assert_eq!(labels[0], "May 24");
        assert_eq!(labels[7], "December 24");
        assert_eq!(labels[8], "January 25");
        assert_eq!(labels[11], "April 25");
    }

    #[test]
    fn test_zero_labels() {
        let start = parse_start_month("2024-05").unwrap();
        assert!(month_labels(start, 0).unwrap().is_empty());
    }
}
