// src/middleware/i18n.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use crate::{common::i18n::I18nStore, config::AppState};

// Idioma da requisição, já resolvido contra os catálogos disponíveis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Locale {
    /// Primeiro idioma do cabeçalho que tenha catálogo. Sem nenhum, o padrão da loja.
    pub fn negotiate(header_value: Option<&str>, store: &I18nStore) -> Self {
        let lang = header_value
            .map(accept_language::parse)
            .unwrap_or_default()
            .into_iter()
            .map(|tag| {
                // "de-AT" -> "de"
                tag.split('-').next().unwrap_or(&tag).to_ascii_lowercase()
            })
            .find(|lang| store.supports(lang))
            .unwrap_or_else(|| store.resolve_lang("").to_string());

        Locale(lang)
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let header_value = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());

        Ok(Locale::negotiate(header_value, &app_state.i18n_store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_supported_language() {
        let store = I18nStore::load().unwrap();

        assert_eq!(Locale::negotiate(Some("en-US,en;q=0.9"), &store).0, "en");
        assert_eq!(Locale::negotiate(Some("fr-FR,en;q=0.5"), &store).0, "en");
        assert_eq!(Locale::negotiate(Some("de-AT"), &store).0, "de");
    }

    #[test]
    fn falls_back_to_german() {
        let store = I18nStore::load().unwrap();

        assert_eq!(Locale::negotiate(None, &store).0, "de");
        assert_eq!(Locale::negotiate(Some("fr"), &store).0, "de");
        assert_eq!(Locale::negotiate(Some(""), &store).0, "de");
    }
}
