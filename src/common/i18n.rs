// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

pub const DEFAULT_LANG: &str = "de";

// Catálogos embutidos no binário. Cada arquivo é um objeto JSON plano: chave -> texto.
const CATALOGS: &[(&str, &str)] = &[
    ("de", include_str!("../../locales/de.json")),
    ("en", include_str!("../../locales/en.json")),
];

#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
    default_lang: String,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Catálogo de traduções inválido: {}", lang))?;
            catalogs.insert(lang.to_string(), messages);
        }

        Ok(Self { catalogs, default_lang: DEFAULT_LANG.to_string() })
    }

    /// Idioma efetivo: o pedido, se existir catálogo para ele, senão o padrão.
    pub fn resolve_lang<'a>(&'a self, lang: &'a str) -> &'a str {
        if self.catalogs.contains_key(lang) {
            lang
        } else {
            &self.default_lang
        }
    }

    pub fn supports(&self, lang: &str) -> bool {
        self.catalogs.contains_key(lang)
    }

    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.catalogs
            .get(lang)
            .and_then(|c| c.get(key))
            .or_else(|| self.catalogs.get(&self.default_lang).and_then(|c| c.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Tradução com substituição de `{nome}` pelos argumentos.
    pub fn translate_with(&self, lang: &str, key: &str, args: &[(&str, String)]) -> String {
        let mut text = self.translate(lang, key);
        for (name, value) in args {
            text = text.replace(&format!("{{{}}}", name), value);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_language_then_key() {
        let store = I18nStore::load().unwrap();

        assert_eq!(store.translate("fr", "category.food"), store.translate("de", "category.food"));
        assert_eq!(store.translate("en", "no.such.key"), "no.such.key");
        assert_eq!(store.resolve_lang("fr"), DEFAULT_LANG);
        assert_eq!(store.resolve_lang("en"), "en");
    }

    #[test]
    fn substitutes_placeholders() {
        let store = I18nStore::load().unwrap();
        let text = store.translate_with("en", "document.tax_line", &[("rate", "19".to_string())]);

        assert!(text.contains("19"));
        assert!(!text.contains("{rate}"));
    }

    #[test]
    fn catalogs_have_the_same_keys() {
        let store = I18nStore::load().unwrap();
        let de = &store.catalogs["de"];
        let en = &store.catalogs["en"];

        let mut missing: Vec<&String> = de.keys().filter(|k| !en.contains_key(*k)).collect();
        missing.extend(en.keys().filter(|k| !de.contains_key(*k)));
        assert!(missing.is_empty(), "chaves sem tradução: {:?}", missing);
    }
}
