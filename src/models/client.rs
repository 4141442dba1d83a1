// src/models/client.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    #[schema(example = "Anna Schmidt")]
    pub name: String,
    #[schema(example = "Schmidt & Partner GmbH")]
    pub company: Option<String>,
    #[schema(example = "anna@schmidt-partner.de")]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[schema(example = "Hauptstraße 12")]
    pub street: Option<String>,
    #[schema(example = "80331")]
    pub postal_code: Option<String>,
    #[schema(example = "München")]
    pub city: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Nome para exibição: empresa quando houver, senão a pessoa.
    pub fn display_name(&self) -> String {
        match &self.company {
            Some(company) if !company.trim().is_empty() => format!("{} ({})", company, self.name),
            _ => self.name.clone(),
        }
    }

    /// Linhas de endereço para o cabeçalho do documento.
    pub fn address_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(street) = self.street.as_deref().filter(|s| !s.is_empty()) {
            lines.push(street.to_string());
        }
        let city_line = [self.postal_code.as_deref(), self.city.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !city_line.is_empty() {
            lines.push(city_line);
        }
        lines
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[validate(length(min = 1, message = "validation.name_required"))]
    #[schema(example = "Anna Schmidt")]
    pub name: String,
    pub company: Option<String>,
    #[validate(email(message = "validation.email"))]
    #[schema(example = "anna@schmidt-partner.de")]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClientSearch {
    /// Busca por nome, empresa ou e-mail
    pub q: Option<String>,
}
