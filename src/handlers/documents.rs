// src/handlers/documents.rs
// Saídas do documento de orçamento: prévia estruturada, versão imprimível e PDF.
// As três usam o mesmo DocumentView, no idioma do Accept-Language.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    services::document_service::DocumentView,
};

// GET /api/quotations/{id}/preview
#[utoipa::path(
    get,
    path = "/api/quotations/{id}/preview",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Documento estruturado pronto para exibição", body = DocumentView),
        (status = 404, description = "Orçamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn preview_quotation(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let view = app_state
        .document_service
        .view(id, &locale.0, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(view)))
}

// GET /api/quotations/{id}/print
#[utoipa::path(
    get,
    path = "/api/quotations/{id}/print",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "HTML imprimível", body = String, content_type = "text/html"),
        (status = 404, description = "Orçamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn print_quotation(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, ApiError> {
    let html = app_state
        .document_service
        .html(id, &locale.0, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Html(html))
}

// GET /api/quotations/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/quotations/{id}/pdf",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "PDF do orçamento", body = [u8], content_type = "application/pdf"),
        (status = 404, description = "Orçamento não encontrado"),
        (status = 500, description = "Fontes do PDF ausentes")
    ),
    security(("api_jwt" = []))
)]
pub async fn quotation_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (filename, pdf_bytes) = app_state
        .document_service
        .pdf(id, &locale.0, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Configura os Headers para o navegador baixar ou mostrar o PDF
    let disposition = format!("inline; filename=\"{}\"", filename);
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, pdf_bytes).into_response())
}
