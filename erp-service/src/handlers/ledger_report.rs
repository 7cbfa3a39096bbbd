use crate::dtos::LedgerReportParams;
use crate::handlers::store_failed;
use crate::models::ledger_report::{build_report, cash_movement, document_movements};
use crate::models::{FiscalYear, LedgerReport};
use crate::startup::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use service_core::error::AppError;
use tracing::info;
use uuid::Uuid;

/// Statement for one account over `[from, to]`.
#[tracing::instrument(skip_all)]
pub async fn ledger_report(
    State(state): State<AppState>,
    Query(params): Query<LedgerReportParams>,
) -> Result<Json<LedgerReport>, AppError> {
    let fiscal_year = FiscalYear::current();
    let from = params.from.unwrap_or_else(|| fiscal_year.start_date());
    let to = params.to.unwrap_or_else(|| fiscal_year.end_date());
    if from > to {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "'from' ({}) is after 'to' ({})",
            from,
            to
        )));
    }

    let account = match Uuid::parse_str(params.account.trim()) {
        Ok(account_id) => state.store.get_account(account_id).await,
        Err(_) => state.store.find_account_by_name(&params.account).await,
    }
    .map_err(store_failed)?
    .ok_or_else(|| {
        AppError::NotFound(anyhow::anyhow!("Account '{}' not found", params.account))
    })?;

    let documents = state
        .store
        .party_documents(&account.name, to)
        .await
        .map_err(store_failed)?;
    let cash_lines = state
        .store
        .account_cash_lines(&account.name, to)
        .await
        .map_err(store_failed)?;

    let movements = documents
        .iter()
        .flat_map(document_movements)
        .chain(cash_lines.iter().filter_map(cash_movement))
        .collect();

    let report = build_report(&account, from, to, movements);

    info!(
        account_id = %report.account_id,
        lines = report.lines.len(),
        closing_balance = %report.closing_balance,
        "Ledger report built"
    );

    Ok(Json(report))
}
