use crate::dtos::{AccountListResponse, AccountResponse, CreateAccountRequest};
use crate::handlers::store_failed;
use crate::startup::AppState;
use crate::utils::ValidatedJson;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

#[tracing::instrument(skip_all)]
pub async fn create_account(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let account = state
        .store
        .create_account(&body.into_input())
        .await
        .map_err(store_failed)?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

#[tracing::instrument(skip_all)]
pub async fn list_accounts(
    State(state): State<AppState>,
) -> Result<Json<AccountListResponse>, AppError> {
    let accounts = state.store.list_accounts().await.map_err(store_failed)?;

    Ok(Json(AccountListResponse {
        accounts: accounts.into_iter().map(AccountResponse::from).collect(),
    }))
}

#[tracing::instrument(skip_all, fields(account_id = %account_id))]
pub async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = state
        .store
        .get_account(account_id)
        .await
        .map_err(store_failed)?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Account {} not found", account_id)))?;

    Ok(Json(account.into()))
}
