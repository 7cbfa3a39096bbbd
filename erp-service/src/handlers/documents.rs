//! Estimates, sales and purchases share one set of handlers; `routes` mounts
//! them for a single kind.

use crate::dtos::{DocumentListParams, DocumentListResponse, DocumentRequest, DocumentResponse};
use crate::handlers::{rejected, store_failed};
use crate::models::{DocumentKind, ListDocumentsFilter, NewDocument};
use crate::services::metrics::record_document_saved;
use crate::startup::AppState;
use crate::utils::ValidatedJson;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use service_core::error::AppError;
use uuid::Uuid;

pub fn routes(kind: DocumentKind) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(
                move |State(state): State<AppState>,
                      Query(params): Query<DocumentListParams>| {
                    list_documents(kind, state, params)
                },
            )
            .post(
                move |State(state): State<AppState>,
                      ValidatedJson(body): ValidatedJson<DocumentRequest>| {
                    create_document(kind, state, body)
                },
            ),
        )
        .route(
            "/:id",
            get(
                move |State(state): State<AppState>, Path(id): Path<Uuid>| {
                    get_document(kind, state, id)
                },
            )
            .put(
                move |State(state): State<AppState>,
                      Path(id): Path<Uuid>,
                      ValidatedJson(body): ValidatedJson<DocumentRequest>| {
                    update_document(kind, state, id, body)
                },
            ),
        )
}

fn not_found(kind: DocumentKind, document_id: Uuid) -> AppError {
    AppError::NotFound(anyhow::anyhow!("{} {} not found", kind.label(), document_id))
}

/// Recompute every figure on the server; client amounts are never trusted.
fn prepare(kind: DocumentKind, body: &DocumentRequest) -> Result<NewDocument, AppError> {
    let totals = body.totals().map_err(rejected)?;
    let header = body
        .header()
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Date is required")))?;
    Ok(NewDocument::from_totals(kind, header, &totals))
}

#[tracing::instrument(skip_all, fields(kind = %kind))]
pub async fn list_documents(
    kind: DocumentKind,
    state: AppState,
    params: DocumentListParams,
) -> Result<Json<DocumentListResponse>, AppError> {
    let filter = ListDocumentsFilter::from(params);
    let documents = state
        .store
        .list_documents(kind, &filter)
        .await
        .map_err(store_failed)?;

    Ok(Json(DocumentListResponse {
        kind,
        documents: documents.into_iter().map(Into::into).collect(),
        page: filter.page,
        page_size: filter.page_size,
    }))
}

#[tracing::instrument(skip_all, fields(kind = %kind))]
pub async fn create_document(
    kind: DocumentKind,
    state: AppState,
    body: DocumentRequest,
) -> Result<(StatusCode, Json<DocumentResponse>), AppError> {
    let new = prepare(kind, &body)?;
    let stored = state
        .store
        .create_document(&new)
        .await
        .map_err(store_failed)?;

    record_document_saved(kind.as_str(), "create");

    Ok((StatusCode::CREATED, Json(stored.into())))
}

#[tracing::instrument(skip_all, fields(kind = %kind, document_id = %document_id))]
pub async fn get_document(
    kind: DocumentKind,
    state: AppState,
    document_id: Uuid,
) -> Result<Json<DocumentResponse>, AppError> {
    let stored = state
        .store
        .get_document(kind, document_id)
        .await
        .map_err(store_failed)?
        .ok_or_else(|| not_found(kind, document_id))?;

    Ok(Json(stored.into()))
}

#[tracing::instrument(skip_all, fields(kind = %kind, document_id = %document_id))]
pub async fn update_document(
    kind: DocumentKind,
    state: AppState,
    document_id: Uuid,
    body: DocumentRequest,
) -> Result<Json<DocumentResponse>, AppError> {
    let new = prepare(kind, &body)?;
    let stored = state
        .store
        .update_document(document_id, &new)
        .await
        .map_err(store_failed)?
        .ok_or_else(|| not_found(kind, document_id))?;

    record_document_saved(kind.as_str(), "update");

    Ok(Json(stored.into()))
}
