use crate::models::FiscalYear;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LedgerReportParams {
    /// Account name, or its id.
    pub account: String,
    /// Defaults to the start of the current fiscal year.
    pub from: Option<NaiveDate>,
    /// Defaults to the end of the current fiscal year.
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FiscalYearResponse {
    pub year: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<FiscalYear> for FiscalYearResponse {
    fn from(fy: FiscalYear) -> Self {
        Self {
            year: fy.label(),
            start_date: fy.start_date(),
            end_date: fy.end_date(),
        }
    }
}
