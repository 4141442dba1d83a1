// src/db/settings_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::settings::{CompanySettings, UpdateSettingsRequest},
};

const SETTINGS_COLUMNS: &str =
    "company_name, address, phone, email, tax_id, iban, bic, bank_name, footer_text, updated_at";

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Sem linha gravada ainda: devolve tudo vazio.
    pub async fn get(&self) -> Result<CompanySettings, AppError> {
        let settings = sqlx::query_as::<_, CompanySettings>(&format!(
            "SELECT {} FROM company_settings WHERE id = 1",
            SETTINGS_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings.unwrap_or_default())
    }

    pub async fn upsert<'e, E>(&self, executor: E, input: &UpdateSettingsRequest) -> Result<CompanySettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, CompanySettings>(&format!(
            r#"
            INSERT INTO company_settings (
                id, company_name, address, phone, email, tax_id, iban, bic, bank_name, footer_text, updated_at
            )
            VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            ON CONFLICT (id)
            DO UPDATE SET
                company_name = EXCLUDED.company_name,
                address = EXCLUDED.address,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                tax_id = EXCLUDED.tax_id,
                iban = EXCLUDED.iban,
                bic = EXCLUDED.bic,
                bank_name = EXCLUDED.bank_name,
                footer_text = EXCLUDED.footer_text,
                updated_at = NOW()
            RETURNING {}
            "#,
            SETTINGS_COLUMNS
        ))
        .bind(&input.company_name)
        .bind(&input.address)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.tax_id)
        .bind(&input.iban)
        .bind(&input.bic)
        .bind(&input.bank_name)
        .bind(&input.footer_text)
        .fetch_one(executor)
        .await?;

        Ok(settings)
    }
}
