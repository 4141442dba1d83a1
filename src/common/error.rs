// src/common/error.rs

use std::collections::HashMap;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::i18n::I18nStore,
    middleware::{i18n::Locale, json::rejection_detail},
    models::quotation::LifecycleError,
    services::pricing::PricingError,
};

// Erro interno da aplicação. Tudo que sai de repositórios e serviços passa por aqui.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Corpo da requisição inválido: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Erro de precificação: {0}")]
    Pricing(#[from] PricingError),

    #[error("Transição de estado inválida: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Versão desatualizada (esperada {expected}, atual {current})")]
    VersionConflict { expected: i32, current: i32 },

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Usuário não encontrado")]
    UserNotFound,

    // O texto é uma chave do catálogo (ex: "resource.client")
    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Recurso em uso: {0}")]
    ResourceInUse(String),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::Pricing(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidBody(rejection) => match rejection {
                JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => StatusCode::BAD_REQUEST,
                other => other.status(),
            },
            AppError::Lifecycle(_)
            | AppError::VersionConflict { .. }
            | AppError::EmailAlreadyExists
            | AppError::ResourceInUse(_)
            | AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::UserNotFound | AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::FontNotFound(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro interno na resposta HTTP, traduzindo a mensagem para o idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status_code();
        let lang = locale.0.as_str();

        match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => i18n.translate(lang, m),
                            None => i18n.translate(lang, &format!("validation.{}", e.code)),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                ApiError {
                    status,
                    error: i18n.translate(lang, "error.validation"),
                    details: Some(json!(details)),
                }
            }
            AppError::InvalidBody(rejection) => {
                let (field, reason) = rejection_detail(&rejection);
                let message = i18n.translate_with(lang, "validation.invalid_value", &[("reason", reason)]);
                ApiError {
                    status,
                    error: i18n.translate(lang, "error.validation"),
                    details: Some(json!({ field: [message] })),
                }
            }
            AppError::Pricing(err) => {
                let args = err.message_args();
                let message = i18n.translate_with(lang, err.message_key(), &args);
                ApiError {
                    status,
                    error: i18n.translate(lang, "error.validation"),
                    details: Some(json!({ err.field_path(): [message] })),
                }
            }
            AppError::Lifecycle(err) => {
                let args: Vec<_> = err
                    .message_args()
                    .into_iter()
                    .map(|(name, label_key)| (name, i18n.translate(lang, &label_key)))
                    .collect();
                ApiError {
                    status,
                    error: i18n.translate_with(lang, err.message_key(), &args),
                    details: None,
                }
            }
            AppError::VersionConflict { expected, current } => ApiError {
                status,
                error: i18n.translate(lang, "error.version_conflict"),
                details: Some(json!({ "expectedVersion": expected, "currentVersion": current })),
            },
            AppError::EmailAlreadyExists => ApiError::simple(status, i18n.translate(lang, "error.email_exists")),
            AppError::InvalidCredentials => ApiError::simple(status, i18n.translate(lang, "error.invalid_credentials")),
            AppError::InvalidToken => ApiError::simple(status, i18n.translate(lang, "error.invalid_token")),
            AppError::Forbidden => ApiError::simple(status, i18n.translate(lang, "error.forbidden")),
            AppError::UserNotFound => ApiError::simple(status, i18n.translate(lang, "error.user_not_found")),
            AppError::ResourceNotFound(what) => ApiError::simple(
                status,
                i18n.translate_with(lang, "error.not_found", &[("resource", i18n.translate(lang, &what))]),
            ),
            AppError::ResourceInUse(what) => ApiError::simple(
                status,
                i18n.translate_with(lang, "error.in_use", &[("resource", i18n.translate(lang, &what))]),
            ),
            AppError::UniqueConstraintViolation(what) => ApiError::simple(
                status,
                i18n.translate_with(lang, "error.unique", &[("resource", i18n.translate(lang, &what))]),
            ),

            // Tudo que sobra vira 500. O detalhe vai só para o log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                ApiError::simple(status, i18n.translate(lang, "error.internal"))
            }
        }
    }
}

// O corpo de erro que o frontend recebe.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn simple(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, error: error.into(), details: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quotation::QuotationStatus;
    use rust_decimal::Decimal;

    fn store() -> I18nStore {
        I18nStore::load().expect("catálogos embutidos")
    }

    #[test]
    fn maps_taxonomy_to_http_status() {
        assert_eq!(
            AppError::Pricing(PricingError::TaxRateOutOfRange(Decimal::from(150))).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Lifecycle(LifecycleError::InvalidTransition {
                from: QuotationStatus::Draft,
                to: QuotationStatus::Accepted,
            })
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::VersionConflict { expected: 1, current: 2 }.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::ResourceNotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::ResourceInUse("resource.client".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn pricing_error_carries_field_path_in_details() {
        let err = AppError::Pricing(PricingError::InvalidItem {
            index: 2,
            field: "quantity",
            reason: crate::services::pricing::ItemFieldError::Negative,
        });
        let api = err.to_api_error(&Locale("en".into()), &store());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert!(details.get("items[2].quantity").is_some());
    }

    #[test]
    fn resource_names_are_localised() {
        let api = AppError::ResourceNotFound("resource.quotation".into()).to_api_error(&Locale("de".into()), &store());

        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.error, "Angebot wurde nicht gefunden.");
    }

    #[test]
    fn lifecycle_messages_use_localised_status_labels() {
        let err = AppError::Lifecycle(LifecycleError::InvalidTransition {
            from: QuotationStatus::Draft,
            to: QuotationStatus::Accepted,
        });
        let api = err.to_api_error(&Locale("en".into()), &store());

        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.error, "Status change from \"Draft\" to \"Accepted\" is not allowed.");
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let api = AppError::InternalServerError(anyhow::anyhow!("segredo do banco"))
            .to_api_error(&Locale("de".into()), &store());

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("segredo"));
        assert!(api.details.is_none());
    }
}
