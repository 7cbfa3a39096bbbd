use crate::dtos::numeric;
use crate::models::totals::{parse_amount, round_money};
use crate::models::{
    CreateProduct, ListProductsFilter, Product, ProductCategory, ProductUnit, UpdateProduct,
};
use crate::utils::not_blank;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(
        length(max = 200, message = "Name must be at most 200 characters"),
        custom(function = "not_blank")
    )]
    pub name: String,

    pub category: ProductCategory,

    pub unit: ProductUnit,

    #[serde(default, deserialize_with = "numeric::lenient")]
    pub default_rate: String,
}

impl CreateProductRequest {
    pub fn into_input(self) -> CreateProduct {
        CreateProduct {
            name: self.name.trim().to_string(),
            category: self.category,
            unit: self.unit,
            default_rate: round_money(parse_amount(&self.default_rate)),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(
        length(max = 200, message = "Name must be at most 200 characters"),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,

    pub category: Option<ProductCategory>,

    pub unit: Option<ProductUnit>,

    #[serde(default, deserialize_with = "numeric::lenient_opt")]
    pub default_rate: Option<String>,

    pub active: Option<bool>,
}

impl UpdateProductRequest {
    pub fn into_input(self) -> UpdateProduct {
        UpdateProduct {
            name: self.name.map(|n| n.trim().to_string()),
            category: self.category,
            unit: self.unit,
            default_rate: self
                .default_rate
                .map(|rate| round_money(parse_amount(&rate))),
            active: self.active,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    pub category: Option<ProductCategory>,
    #[serde(default)]
    pub active_only: bool,
}

impl From<ProductListParams> for ListProductsFilter {
    fn from(params: ProductListParams) -> Self {
        Self {
            category: params.category,
            active_only: params.active_only,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductResponse {
    pub product_id: String,
    pub name: String,
    pub category: ProductCategory,
    pub unit: ProductUnit,
    pub default_rate: Decimal,
    pub active: bool,
    pub created_utc: String,
    pub updated_utc: String,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            product_id: product.product_id.to_string(),
            category: ProductCategory::from_string(&product.category),
            unit: ProductUnit::from_string(&product.unit),
            name: product.name,
            default_rate: product.default_rate,
            active: product.active,
            created_utc: product.created_utc.to_rfc3339(),
            updated_utc: product.updated_utc.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
}
