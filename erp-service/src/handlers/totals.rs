use crate::dtos::{
    CashBookPreviewResponse, DayBookPreviewRequest, TotalsPreviewRequest, TotalsPreviewResponse,
};
use crate::handlers::rejected;
use crate::utils::ValidatedJson;
use axum::Json;
use service_core::error::AppError;

/// Run a draft document and its pending edits through the reducer without
/// saving anything.
pub async fn preview_totals(
    ValidatedJson(body): ValidatedJson<TotalsPreviewRequest>,
) -> Result<Json<TotalsPreviewResponse>, AppError> {
    let totals = body.run().map_err(rejected)?;
    Ok(Json((&totals).into()))
}

pub async fn preview_day_book(
    ValidatedJson(body): ValidatedJson<DayBookPreviewRequest>,
) -> Result<Json<CashBookPreviewResponse>, AppError> {
    let book = body.run().map_err(rejected)?;
    Ok(Json((&book).into()))
}
