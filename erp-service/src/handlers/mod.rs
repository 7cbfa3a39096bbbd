pub mod accounts;
pub mod day_books;
pub mod documents;
pub mod fiscal_year;
pub mod health;
pub mod ledger_report;
pub mod products;
pub mod totals;

pub use health::{health_check, metrics_endpoint, readiness_check};

use crate::models::totals::TotalsError;
use crate::services::metrics::record_error;
use service_core::error::AppError;

/// A reducer refusal (last line, bad index, empty draft) is the caller's
/// mistake.
pub(crate) fn rejected(err: TotalsError) -> AppError {
    record_error("totals_rejected");
    AppError::BadRequest(anyhow::anyhow!(err))
}

/// Count a store failure before handing it back to axum.
pub(crate) fn store_failed(err: AppError) -> AppError {
    record_error(err.kind());
    err
}
