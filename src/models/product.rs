// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{pricing::ItemCategory, validate_not_negative};

// Item do cardápio / catálogo. O preço aqui é só o padrão: a posição do orçamento
// copia o valor no momento em que é criada.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Antipasti-Platte")]
    pub name: String,
    pub description: Option<String>,
    pub category: ItemCategory,
    #[schema(example = "Platte")]
    pub unit: String,
    #[schema(example = 39.9)]
    pub price: Decimal,
    #[schema(example = true)]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(length(min = 1, message = "validation.name_required"))]
    #[schema(example = "Antipasti-Platte")]
    pub name: String,

    pub description: Option<String>,

    #[schema(example = "food")]
    pub category: ItemCategory,

    #[validate(length(min = 1, message = "validation.required"))]
    #[schema(example = "Platte")]
    pub unit: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = 39.9)]
    pub price: Decimal,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    pub category: Option<ItemCategory>,
    pub active: Option<bool>,
}
