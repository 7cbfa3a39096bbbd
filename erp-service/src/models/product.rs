//! Product master data.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Granite,
    Tiles,
    Marble,
    Other,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Granite => "granite",
            ProductCategory::Tiles => "tiles",
            ProductCategory::Marble => "marble",
            ProductCategory::Other => "other",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "granite" => ProductCategory::Granite,
            "tiles" => ProductCategory::Tiles,
            "marble" => ProductCategory::Marble,
            _ => ProductCategory::Other,
        }
    }
}

/// Selling unit. Area-priced products are quoted per square foot and their
/// document lines carry an area quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductUnit {
    Sqft,
    Piece,
}

impl ProductUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductUnit::Sqft => "sqft",
            ProductUnit::Piece => "piece",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "sqft" => ProductUnit::Sqft,
            _ => ProductUnit::Piece,
        }
    }
}

/// Product type.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub product_id: Uuid,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub default_rate: Decimal,
    pub active: bool,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Input for creating a product type.
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub name: String,
    pub category: ProductCategory,
    pub unit: ProductUnit,
    pub default_rate: Decimal,
}

/// Input for updating a product type. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub category: Option<ProductCategory>,
    pub unit: Option<ProductUnit>,
    pub default_rate: Option<Decimal>,
    pub active: Option<bool>,
}

/// Filter parameters for listing products.
#[derive(Debug, Clone, Default)]
pub struct ListProductsFilter {
    pub category: Option<ProductCategory>,
    pub active_only: bool,
}
