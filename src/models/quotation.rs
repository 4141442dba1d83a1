// src/models/quotation.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    auth::CurrentUser,
    pricing::{LineItem, LineItemInput, PricedLineItem, PricingSummary},
};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "quotation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

// Tabela única da máquina de estados. Tela, API e serviço consultam daqui:
// próximos estados permitidos, cor e rótulo.
//
//   draft -> sent -> accepted | rejected
//   draft | sent -> expired   (derivado na leitura, nunca gravado)
impl QuotationStatus {
    pub const ALL: [QuotationStatus; 5] = [
        QuotationStatus::Draft,
        QuotationStatus::Sent,
        QuotationStatus::Accepted,
        QuotationStatus::Rejected,
        QuotationStatus::Expired,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuotationStatus::Draft => "draft",
            QuotationStatus::Sent => "sent",
            QuotationStatus::Accepted => "accepted",
            QuotationStatus::Rejected => "rejected",
            QuotationStatus::Expired => "expired",
        }
    }

    pub fn allowed_next(self) -> &'static [QuotationStatus] {
        match self {
            QuotationStatus::Draft => &[QuotationStatus::Sent],
            QuotationStatus::Sent => &[QuotationStatus::Accepted, QuotationStatus::Rejected],
            QuotationStatus::Accepted | QuotationStatus::Rejected | QuotationStatus::Expired => &[],
        }
    }

    pub fn can_transition_to(self, next: QuotationStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }

    pub fn color(self) -> &'static str {
        match self {
            QuotationStatus::Draft => "#9E9E9E",
            QuotationStatus::Sent => "#2196F3",
            QuotationStatus::Accepted => "#4CAF50",
            QuotationStatus::Rejected => "#F44336",
            QuotationStatus::Expired => "#FF9800",
        }
    }

    pub fn label_key(self) -> String {
        format!("status.{}", self.as_str())
    }

    /// Status observado em `today`: rascunhos e enviados vencidos aparecem como expirados.
    pub fn effective(self, valid_until: NaiveDate, today: NaiveDate) -> QuotationStatus {
        match self {
            QuotationStatus::Draft | QuotationStatus::Sent if today > valid_until => QuotationStatus::Expired,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "fulfilment_mode", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FulfilmentMode {
    SelfPickup,
    #[default]
    Delivery,
    DeliveryWithStaff,
    WithStaff,
}

impl FulfilmentMode {
    pub fn label_key(self) -> &'static str {
        match self {
            FulfilmentMode::SelfPickup => "fulfilment.self_pickup",
            FulfilmentMode::Delivery => "fulfilment.delivery",
            FulfilmentMode::DeliveryWithStaff => "fulfilment.delivery_with_staff",
            FulfilmentMode::WithStaff => "fulfilment.with_staff",
        }
    }
}

// --- Erros de ciclo de vida ---

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("transição {from:?} -> {to:?} não permitida")]
    InvalidTransition { from: QuotationStatus, to: QuotationStatus },

    #[error("posições bloqueadas no status {0:?}")]
    ItemsLocked(QuotationStatus),

    #[error("orçamento bloqueado no status {0:?}")]
    DetailsLocked(QuotationStatus),

    #[error("orçamento não aceito (status {0:?})")]
    NotAccepted(QuotationStatus),
}

impl LifecycleError {
    pub fn message_key(&self) -> &'static str {
        match self {
            LifecycleError::InvalidTransition { .. } => "error.invalid_transition",
            LifecycleError::ItemsLocked(_) => "error.items_locked",
            LifecycleError::DetailsLocked(_) => "error.details_locked",
            LifecycleError::NotAccepted(_) => "error.not_accepted",
        }
    }

    /// Argumentos da mensagem. Os valores são chaves de rótulo ("status.sent").
    pub fn message_args(&self) -> Vec<(&'static str, String)> {
        match self {
            LifecycleError::InvalidTransition { from, to } => {
                vec![("from", from.label_key()), ("to", to.label_key())]
            }
            LifecycleError::ItemsLocked(status)
            | LifecycleError::DetailsLocked(status)
            | LifecycleError::NotAccepted(status) => vec![("status", status.label_key())],
        }
    }
}

// --- Orçamento ---

#[derive(Debug, Clone, FromRow)]
pub struct Quotation {
    pub id: Uuid,
    pub number: String,
    pub client_id: Uuid,
    pub event_name: String,
    pub event_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub guest_count: Option<i32>,
    pub fulfilment: FulfilmentMode,
    pub notes: Option<String>,
    #[sqlx(json)]
    pub items: Vec<LineItem>,
    #[sqlx(flatten)]
    pub pricing: PricingSummary,
    pub status: QuotationStatus,
    pub valid_until: NaiveDate,
    pub version: i32,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Uma transição aplicada, pronta para virar linha no histórico.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub from: QuotationStatus,
    pub to: QuotationStatus,
    pub actor_id: Uuid,
    pub actor_email: String,
    pub changed_at: DateTime<Utc>,
}

impl Quotation {
    pub fn effective_status(&self, now: DateTime<Utc>) -> QuotationStatus {
        self.status.effective(self.valid_until, now.date_naive())
    }

    /// Posições só mudam enquanto o orçamento é (efetivamente) um rascunho.
    pub fn ensure_items_editable(&self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        match self.effective_status(now) {
            QuotationStatus::Draft => Ok(()),
            other => Err(LifecycleError::ItemsLocked(other)),
        }
    }

    /// Dados do evento podem mudar até a decisão do cliente. Um orçamento expirado
    /// ainda pode ter a validade estendida.
    pub fn ensure_details_editable(&self) -> Result<(), LifecycleError> {
        match self.status {
            QuotationStatus::Draft | QuotationStatus::Sent => Ok(()),
            other => Err(LifecycleError::DetailsLocked(other)),
        }
    }

    pub fn ensure_accepted(&self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        match self.effective_status(now) {
            QuotationStatus::Accepted => Ok(()),
            other => Err(LifecycleError::NotAccepted(other)),
        }
    }

    /// Aplica a transição em memória e devolve o registro para o histórico.
    /// A validação usa o status efetivo: um orçamento vencido não pode mais ser enviado nem aceito.
    pub fn apply_transition(
        &mut self,
        to: QuotationStatus,
        actor: &CurrentUser,
        now: DateTime<Utc>,
    ) -> Result<StatusChange, LifecycleError> {
        let from = self.effective_status(now);
        if !from.can_transition_to(to) {
            return Err(LifecycleError::InvalidTransition { from, to });
        }

        self.status = to;
        self.version += 1;
        self.updated_at = now;

        Ok(StatusChange {
            from,
            to,
            actor_id: actor.id,
            actor_email: actor.email.clone(),
            changed_at: now,
        })
    }

    pub fn to_response(&self, now: DateTime<Utc>) -> QuotationResponse {
        QuotationResponse {
            id: self.id,
            number: self.number.clone(),
            client_id: self.client_id,
            event_name: self.event_name.clone(),
            event_date: self.event_date,
            start_time: self.start_time,
            end_time: self.end_time,
            location: self.location.clone(),
            address: self.address.clone(),
            guest_count: self.guest_count,
            fulfilment: self.fulfilment,
            notes: self.notes.clone(),
            items: self.items.iter().map(LineItem::priced).collect(),
            pricing: self.pricing.clone(),
            status: self.status,
            effective_status: self.effective_status(now),
            valid_until: self.valid_until,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotationResponse {
    pub id: Uuid,
    #[schema(example = "ANG-2024-001")]
    pub number: String,
    pub client_id: Uuid,
    #[schema(example = "Sommerfest Schmidt & Partner")]
    pub event_name: String,
    #[schema(value_type = Option<String>, format = Date, example = "2024-07-12")]
    pub event_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "18:00:00")]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "23:00:00")]
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub address: Option<String>,
    #[schema(example = 80)]
    pub guest_count: Option<i32>,
    pub fulfilment: FulfilmentMode,
    pub notes: Option<String>,
    pub items: Vec<PricedLineItem>,
    pub pricing: PricingSummary,
    pub status: QuotationStatus,
    pub effective_status: QuotationStatus,
    #[schema(value_type = String, format = Date, example = "2024-06-30")]
    pub valid_until: NaiveDate,
    #[schema(example = 1)]
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Histórico ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub id: Uuid,
    pub quotation_id: Uuid,
    pub from_status: QuotationStatus,
    pub to_status: QuotationStatus,
    pub actor_id: Option<Uuid>,
    pub actor_email: Option<String>,
    pub changed_at: DateTime<Utc>,
}

// Metadados de status para o frontend (cores, rótulos e transições num lugar só)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    pub status: QuotationStatus,
    #[schema(example = "Entwurf")]
    pub label: String,
    #[schema(example = "#9E9E9E")]
    pub color: String,
    pub allowed_next: Vec<QuotationStatus>,
    pub terminal: bool,
}

impl StatusInfo {
    // O rótulo chega já traduzido; o resto sai da tabela de estados.
    pub fn new(status: QuotationStatus, label: String) -> Self {
        Self {
            status,
            label,
            color: status.color().to_string(),
            allowed_next: status.allowed_next().to_vec(),
            terminal: status.is_terminal(),
        }
    }
}

// --- Payloads ---

// O status não faz parte do payload: todo orçamento nasce como rascunho.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuotationPayload {
    pub client_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "validation.name_required"))]
    #[schema(example = "Sommerfest Schmidt & Partner")]
    pub event_name: String,
    #[schema(value_type = Option<String>, format = Date, example = "2024-07-12")]
    pub event_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "18:00:00")]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "23:00:00")]
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub address: Option<String>,
    #[validate(range(min = 0, message = "validation.negative"))]
    pub guest_count: Option<i32>,
    #[serde(default)]
    pub fulfilment: FulfilmentMode,
    #[validate(length(max = 4000, message = "validation.length"))]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItemInput>,
    /// Padrão: alíquota configurada no servidor
    #[schema(example = 19.0)]
    pub tax_rate: Option<Decimal>,
    pub deposit_amount: Option<Decimal>,
    #[schema(value_type = Option<String>, format = Date)]
    pub deposit_due_date: Option<NaiveDate>,
    /// Padrão: hoje + validade configurada
    #[schema(value_type = Option<String>, format = Date)]
    pub valid_until: Option<NaiveDate>,
}

// Substitui todas as posições. Sinal ausente = sem sinal; alíquota ausente = mantém a atual.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemsPayload {
    #[schema(example = 1)]
    pub version: i32,
    pub items: Vec<LineItemInput>,
    pub tax_rate: Option<Decimal>,
    pub deposit_amount: Option<Decimal>,
    #[schema(value_type = Option<String>, format = Date)]
    pub deposit_due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDetailsPayload {
    #[schema(example = 1)]
    pub version: i32,
    pub client_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "validation.name_required"))]
    pub event_name: String,
    #[schema(value_type = Option<String>, format = Date)]
    pub event_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub address: Option<String>,
    #[validate(range(min = 0, message = "validation.negative"))]
    pub guest_count: Option<i32>,
    #[serde(default)]
    pub fulfilment: FulfilmentMode,
    #[validate(length(max = 4000, message = "validation.length"))]
    pub notes: Option<String>,
    /// Ausente = mantém a validade atual
    #[schema(value_type = Option<String>, format = Date)]
    pub valid_until: Option<NaiveDate>,
}

impl UpdateDetailsPayload {
    pub fn apply_to(&self, q: &mut Quotation) {
        q.client_id = self.client_id;
        q.event_name = self.event_name.trim().to_string();
        q.event_date = self.event_date;
        q.start_time = self.start_time;
        q.end_time = self.end_time;
        q.location = self.location.clone();
        q.address = self.address.clone();
        q.guest_count = self.guest_count;
        q.fulfilment = self.fulfilment;
        q.notes = self.notes.clone();
        if let Some(valid_until) = self.valid_until {
            q.valid_until = valid_until;
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionStatusPayload {
    #[schema(example = 1)]
    pub version: i32,
    #[schema(example = "sent")]
    pub status: QuotationStatus,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct QuotationFilter {
    /// Filtra pelo status efetivo (inclui "expired")
    pub status: Option<QuotationStatus>,
    pub client_id: Option<Uuid>,
}
