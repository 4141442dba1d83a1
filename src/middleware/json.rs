// src/middleware/json.rs

use axum::{
    extract::{rejection::JsonRejection, FromRef, FromRequest, Request},
    http::header,
    Json,
};
use serde::de::DeserializeOwned;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

// Igual ao Json do axum, mas um corpo ilegível responde 400 no formato {"error","details"},
// já traduzido, em vez do 422 em texto puro.
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let header_value = req
            .headers()
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());
        let locale = Locale::negotiate(header_value, &app_state.i18n_store);

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => {
                tracing::debug!("Corpo JSON rejeitado: {}", rejection.body_text());
                Err(AppError::from(rejection).to_api_error(&locale, &app_state.i18n_store))
            }
        }
    }
}

/// Separa o caminho do campo da mensagem do serde.
/// "…target type: items[0].category: unknown variant" -> ("items[0].category", "unknown variant")
pub fn rejection_detail(rejection: &JsonRejection) -> (String, String) {
    let text = rejection.body_text();
    let reason = text.split_once(": ").map(|(_, rest)| rest).unwrap_or(&text);

    if let JsonRejection::JsonDataError(_) = rejection {
        if let Some((path, message)) = reason.split_once(": ") {
            if !path.is_empty() && !path.contains(char::is_whitespace) && path != "." {
                return (path.to_string(), message.to_string());
            }
        }
    }
    ("body".to_string(), reason.to_string())
}
