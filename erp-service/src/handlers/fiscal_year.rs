use crate::dtos::FiscalYearResponse;
use crate::models::FiscalYear;
use axum::{extract::Query, Json};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FiscalYearParams {
    pub date: Option<NaiveDate>,
}

/// Fiscal year containing `date`, or today.
pub async fn get_fiscal_year(Query(params): Query<FiscalYearParams>) -> Json<FiscalYearResponse> {
    let fy = params
        .date
        .map(FiscalYear::containing)
        .unwrap_or_else(FiscalYear::current);
    Json(fy.into())
}
