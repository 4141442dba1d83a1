// src/handlers/quotations.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, json::AppJson},
    models::{
        order::OrderResponse,
        quotation::{
            CreateQuotationPayload, QuotationFilter, QuotationResponse, QuotationStatus, StatusHistoryEntry,
            StatusInfo, TransitionStatusPayload, UpdateDetailsPayload, UpdateItemsPayload,
        },
    },
};

// POST /api/quotations
#[utoipa::path(
    post,
    path = "/api/quotations",
    tag = "Quotations",
    request_body = CreateQuotationPayload,
    responses(
        (status = 201, description = "Orçamento criado como rascunho", body = QuotationResponse),
        (status = 400, description = "Dados ou preços inválidos"),
        (status = 404, description = "Cliente ou produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_quotation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<CreateQuotationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let now = Utc::now();
    let quotation = app_state
        .quotation_service
        .create(&payload, &user, now)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(quotation.to_response(now))))
}

// GET /api/quotations?status=&clientId=
#[utoipa::path(
    get,
    path = "/api/quotations",
    tag = "Quotations",
    params(QuotationFilter),
    responses((status = 200, description = "Lista de orçamentos", body = Vec<QuotationResponse>)),
    security(("api_jwt" = []))
)]
pub async fn list_quotations(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<QuotationFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();
    let quotations = app_state
        .quotation_service
        .list(&filter, now)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let body: Vec<QuotationResponse> = quotations.iter().map(|q| q.to_response(now)).collect();
    Ok((StatusCode::OK, Json(body)))
}

// GET /api/quotations/statuses
#[utoipa::path(
    get,
    path = "/api/quotations/statuses",
    tag = "Quotations",
    responses((status = 200, description = "Estados, rótulos, cores e transições permitidas", body = Vec<StatusInfo>)),
    security(("api_jwt" = []))
)]
pub async fn list_statuses(State(app_state): State<AppState>, locale: Locale) -> impl IntoResponse {
    let statuses: Vec<StatusInfo> = QuotationStatus::ALL
        .iter()
        .map(|s| StatusInfo::new(*s, app_state.i18n_store.translate(&locale.0, &s.label_key())))
        .collect();

    (StatusCode::OK, Json(statuses))
}

// GET /api/quotations/{id}
#[utoipa::path(
    get,
    path = "/api/quotations/{id}",
    tag = "Quotations",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Orçamento", body = QuotationResponse),
        (status = 404, description = "Orçamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_quotation(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let quotation = app_state
        .quotation_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(quotation.to_response(Utc::now()))))
}

// PUT /api/quotations/{id}
#[utoipa::path(
    put,
    path = "/api/quotations/{id}",
    tag = "Quotations",
    request_body = UpdateDetailsPayload,
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Dados do evento atualizados", body = QuotationResponse),
        (status = 404, description = "Orçamento não encontrado"),
        (status = 409, description = "Orçamento bloqueado ou versão desatualizada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_details(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateDetailsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let quotation = app_state
        .quotation_service
        .update_details(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(quotation.to_response(Utc::now()))))
}

// PUT /api/quotations/{id}/items
#[utoipa::path(
    put,
    path = "/api/quotations/{id}/items",
    tag = "Quotations",
    request_body = UpdateItemsPayload,
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Posições substituídas e reprecificadas", body = QuotationResponse),
        (status = 400, description = "Preços inválidos"),
        (status = 404, description = "Orçamento não encontrado"),
        (status = 409, description = "Orçamento fora do rascunho ou versão desatualizada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_items(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateItemsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();
    let quotation = app_state
        .quotation_service
        .update_items(id, &payload, now)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(quotation.to_response(now))))
}

// PATCH /api/quotations/{id}/status
#[utoipa::path(
    patch,
    path = "/api/quotations/{id}/status",
    tag = "Quotations",
    request_body = TransitionStatusPayload,
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Status alterado", body = QuotationResponse),
        (status = 404, description = "Orçamento não encontrado"),
        (status = 409, description = "Transição não permitida ou versão desatualizada")
    ),
    security(("api_jwt" = []))
)]
pub async fn transition_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<TransitionStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();
    let quotation = app_state
        .quotation_service
        .transition_status(id, payload.version, payload.status, &user, now)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(quotation.to_response(now))))
}

// GET /api/quotations/{id}/history
#[utoipa::path(
    get,
    path = "/api/quotations/{id}/history",
    tag = "Quotations",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Histórico de status, do mais antigo ao mais recente", body = Vec<StatusHistoryEntry>),
        (status = 404, description = "Orçamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_history(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = app_state
        .quotation_service
        .history(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(history)))
}

// POST /api/quotations/{id}/order
#[utoipa::path(
    post,
    path = "/api/quotations/{id}/order",
    tag = "Quotations",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 201, description = "Pedido gerado a partir do orçamento", body = OrderResponse),
        (status = 404, description = "Orçamento não encontrado"),
        (status = 409, description = "Orçamento não aceito ou já convertido")
    ),
    security(("api_jwt" = []))
)]
pub async fn convert_to_order(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .quotation_service
        .convert_to_order(id, &user, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(order.to_response())))
}

// DELETE /api/quotations/{id}
#[utoipa::path(
    delete,
    path = "/api/quotations/{id}",
    tag = "Quotations",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 204, description = "Orçamento e histórico removidos"),
        (status = 404, description = "Orçamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_quotation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .quotation_service
        .delete(id, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
