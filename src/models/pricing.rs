// src/models/pricing.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::pricing::round2;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "item_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Food,
    Beverage,
    Staff,
    Equipment,
    Other,
}

impl ItemCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemCategory::Food => "food",
            ItemCategory::Beverage => "beverage",
            ItemCategory::Staff => "staff",
            ItemCategory::Equipment => "equipment",
            ItemCategory::Other => "other",
        }
    }

    /// Chave do catálogo de traduções (ex: "category.food").
    pub fn label_key(self) -> String {
        format!("category.{}", self.as_str())
    }
}

// --- Posição (Line Item) ---

// Uma posição de um orçamento ou pedido. O total da linha NÃO é armazenado:
// é sempre derivado de quantidade x preço unitário na leitura.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<Uuid>,
    pub category: ItemCategory,
    #[schema(example = "Flying Buffet Mediterran")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[schema(example = 2.0)]
    pub quantity: Decimal,
    #[schema(example = "Person")]
    pub unit: String,
    #[schema(example = 45.0)]
    pub unit_price: Decimal,
}

impl LineItem {
    // Posições gravadas já passaram pelo limite do motor; saturar evita pânico na leitura.
    pub fn total_price(&self) -> Decimal {
        round2(self.quantity.saturating_mul(self.unit_price))
    }

    pub fn priced(&self) -> PricedLineItem {
        PricedLineItem { item: self.clone(), total_price: self.total_price() }
    }
}

// Visão de leitura da posição, com o total calculado.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricedLineItem {
    #[serde(flatten)]
    pub item: LineItem,
    #[schema(example = 90.0)]
    pub total_price: Decimal,
}

// O que o frontend manda. Se vier productId, os campos ausentes são completados pelo catálogo.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    pub id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub category: Option<ItemCategory>,
    #[schema(example = "Fingerfood-Platte")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(example = 2.0)]
    pub quantity: Decimal,
    #[schema(example = "Stück")]
    pub unit: Option<String>,
    #[schema(example = 45.0)]
    pub unit_price: Option<Decimal>,
}

// --- Resumo de preços ---

// Derivado das posições + alíquota. Gravado junto do orçamento apenas como cache:
// é recalculado no servidor a cada alteração e nunca aceito do cliente.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingSummary {
    #[schema(example = 290.0)]
    pub subtotal: Decimal,
    #[schema(example = 19.0)]
    pub tax_rate: Decimal,
    #[schema(example = 55.1)]
    pub tax_amount: Decimal,
    #[schema(example = 345.1)]
    pub total: Decimal,
    pub deposit_amount: Option<Decimal>,
    #[schema(value_type = Option<String>, format = Date, example = "2024-06-01")]
    pub deposit_due_date: Option<NaiveDate>,
}

impl PricingSummary {
    pub fn has_deposit(&self) -> bool {
        self.deposit_amount.is_some_and(|d| d > Decimal::ZERO)
    }
}
