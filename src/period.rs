//! Calendar-month billing periods.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One whole calendar month in UTC: first day 00:00:00 through last day
/// 23:59:59, the window the original tool always invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BillingPeriod {
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        let last = next_month.pred_opt()?;

        let start = Utc.from_utc_datetime(&first.and_hms_opt(0, 0, 0)?);
        let end = Utc.from_utc_datetime(&last.and_hms_opt(23, 59, 59)?);
        Some(Self { start, end })
    }

    /// The month containing `now`.
    pub fn containing(now: DateTime<Utc>) -> Self {
        Self::month(now.year(), now.month()).expect("current month is always representable")
    }

    /// Parses the CLI `YYYY-MM` form.
    pub fn parse(text: &str) -> Option<Self> {
        let (year, month) = text.split_once('-')?;
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        Self::month(year, month)
    }

    /// Invariant-culture label, e.g. "September 2025". Used in the invoice
    /// header and the output file name.
    pub fn label(&self) -> String {
        let month = MONTH_NAMES[(self.start.month() - 1) as usize];
        format!("{} {}", month, self.start.year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_spans_first_to_last_second() {
        let period = BillingPeriod::month(2025, 9).unwrap();
        assert_eq!(period.start.to_rfc3339(), "2025-09-01T00:00:00+00:00");
        assert_eq!(period.end.to_rfc3339(), "2025-09-30T23:59:59+00:00");
    }

    #[test]
    fn december_rolls_into_the_next_year() {
        let period = BillingPeriod::month(2025, 12).unwrap();
        assert_eq!(period.end.to_rfc3339(), "2025-12-31T23:59:59+00:00");
    }

    #[test]
    fn february_leap_year_has_29_days() {
        let period = BillingPeriod::month(2024, 2).unwrap();
        assert_eq!(period.end.to_rfc3339(), "2024-02-29T23:59:59+00:00");
    }

    #[test]
    fn parse_accepts_year_month_and_rejects_garbage() {
        assert_eq!(
            BillingPeriod::parse("2025-09"),
            Some(BillingPeriod::month(2025, 9).unwrap())
        );
        assert_eq!(BillingPeriod::parse("2025-13"), None);
        assert_eq!(BillingPeriod::parse("september"), None);
    }

    #[test]
    fn label_is_invariant_month_and_year() {
        assert_eq!(BillingPeriod::month(2025, 9).unwrap().label(), "September 2025");
    }
}
