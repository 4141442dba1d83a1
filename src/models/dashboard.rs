// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::quotation::QuotationStatus;

// Cards do topo
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub clients: i64,
    pub active_products: i64,
    pub quotations_by_status: Vec<StatusCount>,
    #[schema(example = 12840.5)]
    pub accepted_value: Decimal, // soma dos totais brutos aceitos
    pub open_orders: i64,
    pub upcoming_events: Vec<UpcomingEvent>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: QuotationStatus,
    pub count: i64,
}

// Próximos eventos com orçamento aceito ou em aberto
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingEvent {
    pub quotation_id: Uuid,
    pub number: String,
    pub event_name: String,
    #[schema(value_type = String, format = Date)]
    pub event_date: NaiveDate,
    pub client_name: String,
    pub status: QuotationStatus,
    pub total: Decimal,
}
