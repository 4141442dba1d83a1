pub mod user_repo;
pub use user_repo::UserRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod quotation_repo;
pub use quotation_repo::QuotationRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;

use sqlx::{Executor, Postgres};

use crate::common::error::AppError;

pub const QUOTATION_PREFIX: &str = "ANG";
pub const ORDER_PREFIX: &str = "AUF";

/// Reserva o próximo número do ano para o prefixo (ex: "ANG-2024-007").
/// Deve rodar dentro da mesma transação que grava o documento.
pub async fn next_document_number<'e, E>(executor: E, prefix: &str, year: i32) -> Result<String, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let (seq,): (i32,) = sqlx::query_as(
        r#"
        INSERT INTO document_sequences (prefix, year, last_value)
        VALUES ($1, $2, 1)
        ON CONFLICT (prefix, year)
        DO UPDATE SET last_value = document_sequences.last_value + 1
        RETURNING last_value
        "#,
    )
    .bind(prefix)
    .bind(year)
    .fetch_one(executor)
    .await?;

    Ok(format_document_number(prefix, year, seq))
}

pub fn format_document_number(prefix: &str, year: i32, seq: i32) -> String {
    format!("{}-{}-{:03}", prefix, year, seq)
}

// Traduz violações de FK/unicidade do Postgres para os erros de domínio.
// `resource` é a chave do catálogo (ex: "resource.client").
pub(crate) fn map_constraint_error(e: sqlx::Error, resource: &str) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(resource.to_string());
        }
        if db_err.is_foreign_key_violation() {
            return AppError::ResourceInUse(resource.to_string());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_numbers_are_zero_padded_per_year() {
        assert_eq!(format_document_number(QUOTATION_PREFIX, 2024, 1), "ANG-2024-001");
        assert_eq!(format_document_number(ORDER_PREFIX, 2025, 42), "AUF-2025-042");
        assert_eq!(format_document_number(QUOTATION_PREFIX, 2024, 1234), "ANG-2024-1234");
    }
}
