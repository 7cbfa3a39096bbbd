//! Fiscal-year tagging (April to March).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// First month of the fiscal year.
const START_MONTH: u32 = 4;

/// A fiscal year, e.g. `2024-25` runs 2024-04-01 to 2025-03-31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FiscalYear {
    start_year: i32,
}

impl FiscalYear {
    pub fn containing(date: NaiveDate) -> Self {
        let start_year = if date.month() >= START_MONTH {
            date.year()
        } else {
            date.year() - 1
        };
        Self { start_year }
    }

    pub fn current() -> Self {
        Self::containing(chrono::Local::now().date_naive())
    }

    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.start_year, START_MONTH, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn end_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.start_year + 1, START_MONTH, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Tag stored on documents, `YYYY-YY`.
    pub fn label(&self) -> String {
        format!(
            "{}-{:02}",
            self.start_year,
            (self.start_year + 1).rem_euclid(100)
        )
    }

    /// Parse a `YYYY-YY` tag.
    pub fn parse(label: &str) -> Option<Self> {
        let (start, end) = label.trim().split_once('-')?;
        let start_year: i32 = start.parse().ok()?;
        let end_short: i32 = end.parse().ok()?;
        if start.len() != 4 || end.len() != 2 || (start_year + 1).rem_euclid(100) != end_short {
            return None;
        }
        Some(Self { start_year })
    }
}

impl std::fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn year_boundary_is_april_first() {
        assert_eq!(FiscalYear::containing(date(2025, 3, 31)).label(), "2024-25");
        assert_eq!(FiscalYear::containing(date(2025, 4, 1)).label(), "2025-26");
        assert_eq!(FiscalYear::containing(date(2024, 5, 10)).label(), "2024-25");
        assert_eq!(FiscalYear::containing(date(2099, 12, 1)).label(), "2099-00");
    }

    #[test]
    fn start_and_end_dates() {
        let fy = FiscalYear::containing(date(2024, 1, 15));
        assert_eq!(fy.start_date(), date(2023, 4, 1));
        assert_eq!(fy.end_date(), date(2024, 3, 31));
    }

    #[test]
    fn parse_round_trips_label() {
        assert_eq!(
            FiscalYear::parse("2024-25"),
            Some(FiscalYear::containing(date(2024, 6, 1)))
        );
        assert_eq!(FiscalYear::parse("2024-26"), None);
        assert_eq!(FiscalYear::parse("24-25"), None);
        assert_eq!(FiscalYear::parse("garbage"), None);
    }
}
