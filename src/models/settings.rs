// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// Dados da empresa que aparecem no cabeçalho/rodapé dos documentos.
// Existe no máximo uma linha na tabela.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    #[schema(example = "Kellers Feinkost & Catering GmbH")]
    pub company_name: Option<String>,

    #[schema(example = "Marktstraße 12, 50667 Köln")]
    pub address: Option<String>,

    #[schema(example = "+49 221 123456")]
    pub phone: Option<String>,

    #[schema(example = "info@kellers-catering.de")]
    pub email: Option<String>,

    #[schema(example = "DE123456789")]
    pub tax_id: Option<String>,

    #[schema(example = "DE89370400440532013000")]
    pub iban: Option<String>,

    #[schema(example = "COBADEFFXXX")]
    pub bic: Option<String>,

    #[schema(example = "Commerzbank Köln")]
    pub bank_name: Option<String>,

    #[schema(example = "Wir freuen uns auf Ihre Veranstaltung!")]
    pub footer_text: Option<String>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl CompanySettings {
    /// IBAN sem espaços, se houver uma configurada.
    pub fn normalized_iban(&self) -> Option<String> {
        self.iban
            .as_deref()
            .map(|iban| iban.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_uppercase())
            .filter(|iban| !iban.is_empty())
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[validate(length(max = 200, message = "validation.length"))]
    pub company_name: Option<String>,
    #[validate(length(max = 500, message = "validation.length"))]
    pub address: Option<String>,
    #[validate(length(max = 50, message = "validation.length"))]
    pub phone: Option<String>,
    #[validate(email(message = "validation.email"))]
    pub email: Option<String>,
    #[validate(length(max = 50, message = "validation.length"))]
    pub tax_id: Option<String>,
    #[validate(length(min = 15, max = 42, message = "validation.length"))]
    pub iban: Option<String>,
    #[validate(length(min = 8, max = 11, message = "validation.length"))]
    pub bic: Option<String>,
    #[validate(length(max = 200, message = "validation.length"))]
    pub bank_name: Option<String>,
    #[validate(length(max = 1000, message = "validation.length"))]
    pub footer_text: Option<String>,
}
