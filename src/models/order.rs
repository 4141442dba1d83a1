// src/models/order.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    pricing::{LineItem, LineItemInput, PricedLineItem, PricingSummary},
    quotation::FulfilmentMode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    InPreparation,
    Delivered,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Pedidos ainda em andamento (contam no painel).
    pub fn is_open(self) -> bool {
        !matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub number: String,
    pub client_id: Uuid,
    pub quotation_id: Option<Uuid>,
    #[sqlx(json)]
    pub items: Vec<LineItem>,
    #[sqlx(flatten)]
    pub pricing: PricingSummary,
    pub status: OrderStatus,
    pub fulfilment: FulfilmentMode,
    pub delivery_date: Option<NaiveDate>,
    pub delivery_time: Option<NaiveTime>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn to_response(&self) -> OrderResponse {
        OrderResponse {
            id: self.id,
            number: self.number.clone(),
            client_id: self.client_id,
            quotation_id: self.quotation_id,
            items: self.items.iter().map(LineItem::priced).collect(),
            pricing: self.pricing.clone(),
            status: self.status,
            fulfilment: self.fulfilment,
            delivery_date: self.delivery_date,
            delivery_time: self.delivery_time,
            delivery_address: self.delivery_address.clone(),
            notes: self.notes.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    #[schema(example = "AUF-2024-001")]
    pub number: String,
    pub client_id: Uuid,
    pub quotation_id: Option<Uuid>,
    pub items: Vec<PricedLineItem>,
    pub pricing: PricingSummary,
    pub status: OrderStatus,
    pub fulfilment: FulfilmentMode,
    #[schema(value_type = Option<String>, format = Date)]
    pub delivery_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "11:30:00")]
    pub delivery_time: Option<NaiveTime>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Usado tanto na criação quanto na edição: as posições são sempre reprecificadas.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub client_id: Uuid,
    #[serde(default)]
    pub items: Vec<LineItemInput>,
    #[schema(example = 19.0)]
    pub tax_rate: Option<Decimal>,
    #[serde(default)]
    pub fulfilment: FulfilmentMode,
    #[schema(value_type = Option<String>, format = Date)]
    pub delivery_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub delivery_time: Option<NaiveTime>,
    #[validate(length(max = 500, message = "validation.length"))]
    pub delivery_address: Option<String>,
    #[validate(length(max = 4000, message = "validation.length"))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusPayload {
    pub status: OrderStatus,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub client_id: Option<Uuid>,
}
