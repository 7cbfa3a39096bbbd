use crate::dtos::{
    CalendarParams, CalendarResponse, DayBookListParams, DayBookListResponse, DayBookRequest,
    DayBookResponse, DayBookSummaryResponse,
};
use crate::handlers::{rejected, store_failed};
use crate::models::{CalendarDay, NewDayBook};
use crate::services::metrics::record_day_book_saved;
use crate::startup::AppState;
use crate::utils::ValidatedJson;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

fn not_found(day_book_id: Uuid) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Day book {} not found", day_book_id))
}

fn prepare(body: &DayBookRequest) -> Result<NewDayBook, AppError> {
    let book = body.cash_book().map_err(rejected)?;
    let date = body
        .date
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Date is required")))?;
    let narration = body.narration.clone().filter(|n| !n.trim().is_empty());
    Ok(NewDayBook::from_cash_book(date, narration, &book))
}

#[tracing::instrument(skip_all)]
pub async fn create_day_book(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<DayBookRequest>,
) -> Result<(StatusCode, Json<DayBookResponse>), AppError> {
    let new = prepare(&body)?;
    let stored = state
        .store
        .create_day_book(&new)
        .await
        .map_err(store_failed)?;

    record_day_book_saved("create");

    Ok((StatusCode::CREATED, Json(stored.into())))
}

#[tracing::instrument(skip_all, fields(from = ?params.from, to = ?params.to))]
pub async fn list_day_books(
    State(state): State<AppState>,
    Query(params): Query<DayBookListParams>,
) -> Result<Json<DayBookListResponse>, AppError> {
    let books = state
        .store
        .list_day_books(params.from, params.to)
        .await
        .map_err(store_failed)?;

    Ok(Json(DayBookListResponse {
        day_books: books.into_iter().map(DayBookSummaryResponse::from).collect(),
    }))
}

#[tracing::instrument(skip_all, fields(day_book_id = %day_book_id))]
pub async fn get_day_book(
    State(state): State<AppState>,
    Path(day_book_id): Path<Uuid>,
) -> Result<Json<DayBookResponse>, AppError> {
    let stored = state
        .store
        .get_day_book(day_book_id)
        .await
        .map_err(store_failed)?
        .ok_or_else(|| not_found(day_book_id))?;

    Ok(Json(stored.into()))
}

#[tracing::instrument(skip_all, fields(day_book_id = %day_book_id))]
pub async fn update_day_book(
    State(state): State<AppState>,
    Path(day_book_id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<DayBookRequest>,
) -> Result<Json<DayBookResponse>, AppError> {
    let new = prepare(&body)?;
    let stored = state
        .store
        .update_day_book(day_book_id, &new)
        .await
        .map_err(store_failed)?
        .ok_or_else(|| not_found(day_book_id))?;

    record_day_book_saved("update");

    Ok(Json(stored.into()))
}

/// Per-day totals for one month, days without an entry omitted.
#[tracing::instrument(skip_all, fields(month = %params.month))]
pub async fn calendar(
    State(state): State<AppState>,
    Query(params): Query<CalendarParams>,
) -> Result<Json<CalendarResponse>, AppError> {
    let (first, last) = params.range().ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!(
            "Invalid month '{}', expected YYYY-MM",
            params.month
        ))
    })?;

    let books = state
        .store
        .list_day_books(Some(first), Some(last))
        .await
        .map_err(store_failed)?;

    Ok(Json(CalendarResponse {
        month: first.format("%Y-%m").to_string(),
        days: books.iter().map(CalendarDay::from).collect(),
    }))
}
