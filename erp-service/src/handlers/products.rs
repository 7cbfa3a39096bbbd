use crate::dtos::{
    CreateProductRequest, ProductListParams, ProductListResponse, ProductResponse,
    UpdateProductRequest,
};
use crate::handlers::store_failed;
use crate::startup::AppState;
use crate::utils::ValidatedJson;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

fn not_found(product_id: Uuid) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Product {} not found", product_id))
}

#[tracing::instrument(skip_all)]
pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    let product = state
        .store
        .create_product(&body.into_input())
        .await
        .map_err(store_failed)?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

#[tracing::instrument(skip_all, fields(category = ?params.category, active_only = params.active_only))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> Result<Json<ProductListResponse>, AppError> {
    let products = state
        .store
        .list_products(&params.into())
        .await
        .map_err(store_failed)?;

    Ok(Json(ProductListResponse {
        products: products.into_iter().map(ProductResponse::from).collect(),
    }))
}

#[tracing::instrument(skip_all, fields(product_id = %product_id))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state
        .store
        .get_product(product_id)
        .await
        .map_err(store_failed)?
        .ok_or_else(|| not_found(product_id))?;

    Ok(Json(product.into()))
}

#[tracing::instrument(skip_all, fields(product_id = %product_id))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state
        .store
        .update_product(product_id, &body.into_input())
        .await
        .map_err(store_failed)?
        .ok_or_else(|| not_found(product_id))?;

    Ok(Json(product.into()))
}
