// src/db/quotation_repo.rs
//
// Toda escrita que muda um orçamento existente é um compare-and-swap na coluna `version`:
// `None` como retorno significa que outra requisição gravou antes.

use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::map_constraint_error,
    models::{
        pricing::{LineItem, PricingSummary},
        quotation::{Quotation, QuotationStatus, StatusChange, StatusHistoryEntry},
    },
};

const RESOURCE: &str = "resource.quotation";

#[derive(Clone)]
pub struct QuotationRepository {
    pool: PgPool,
}

impl QuotationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(&self, executor: E, q: &Quotation) -> Result<Quotation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Quotation>(
            r#"
            INSERT INTO quotations (
                id, number, client_id, event_name, event_date, start_time, end_time,
                location, address, guest_count, fulfilment, notes, items,
                subtotal, tax_rate, tax_amount, total, deposit_amount, deposit_due_date,
                status, valid_until, version, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22, $23)
            RETURNING *
            "#,
        )
        .bind(q.id)
        .bind(&q.number)
        .bind(q.client_id)
        .bind(&q.event_name)
        .bind(q.event_date)
        .bind(q.start_time)
        .bind(q.end_time)
        .bind(&q.location)
        .bind(&q.address)
        .bind(q.guest_count)
        .bind(q.fulfilment)
        .bind(&q.notes)
        .bind(Json(&q.items))
        .bind(q.pricing.subtotal)
        .bind(q.pricing.tax_rate)
        .bind(q.pricing.tax_amount)
        .bind(q.pricing.total)
        .bind(q.pricing.deposit_amount)
        .bind(q.pricing.deposit_due_date)
        .bind(q.status)
        .bind(q.valid_until)
        .bind(q.version)
        .bind(q.created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, RESOURCE))
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Quotation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quotation = sqlx::query_as::<_, Quotation>("SELECT * FROM quotations WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(quotation)
    }

    // O filtro por status é feito no serviço, sobre o status efetivo.
    pub async fn list(&self, client_id: Option<Uuid>) -> Result<Vec<Quotation>, AppError> {
        let quotations = sqlx::query_as::<_, Quotation>(
            r#"
            SELECT * FROM quotations
            WHERE ($1::uuid IS NULL OR client_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(quotations)
    }

    pub async fn update_items<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        expected_version: i32,
        items: &[LineItem],
        pricing: &PricingSummary,
    ) -> Result<Option<Quotation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quotation = sqlx::query_as::<_, Quotation>(
            r#"
            UPDATE quotations
            SET items = $3,
                subtotal = $4, tax_rate = $5, tax_amount = $6, total = $7,
                deposit_amount = $8, deposit_due_date = $9,
                version = version + 1, updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected_version)
        .bind(Json(items))
        .bind(pricing.subtotal)
        .bind(pricing.tax_rate)
        .bind(pricing.tax_amount)
        .bind(pricing.total)
        .bind(pricing.deposit_amount)
        .bind(pricing.deposit_due_date)
        .fetch_optional(executor)
        .await?;
        Ok(quotation)
    }

    /// Grava os dados do evento de `q`. Preços e posições não são tocados.
    pub async fn update_details<'e, E>(
        &self,
        executor: E,
        q: &Quotation,
        expected_version: i32,
    ) -> Result<Option<Quotation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quotation = sqlx::query_as::<_, Quotation>(
            r#"
            UPDATE quotations
            SET client_id = $3, event_name = $4, event_date = $5, start_time = $6, end_time = $7,
                location = $8, address = $9, guest_count = $10, fulfilment = $11, notes = $12,
                valid_until = $13,
                version = version + 1, updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(q.id)
        .bind(expected_version)
        .bind(q.client_id)
        .bind(&q.event_name)
        .bind(q.event_date)
        .bind(q.start_time)
        .bind(q.end_time)
        .bind(&q.location)
        .bind(&q.address)
        .bind(q.guest_count)
        .bind(q.fulfilment)
        .bind(&q.notes)
        .bind(q.valid_until)
        .fetch_optional(executor)
        .await?;
        Ok(quotation)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        expected_version: i32,
        status: QuotationStatus,
    ) -> Result<Option<Quotation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quotation = sqlx::query_as::<_, Quotation>(
            r#"
            UPDATE quotations
            SET status = $3, version = version + 1, updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected_version)
        .bind(status)
        .fetch_optional(executor)
        .await?;
        Ok(quotation)
    }

    pub async fn insert_history<'e, E>(
        &self,
        executor: E,
        quotation_id: Uuid,
        change: &StatusChange,
    ) -> Result<StatusHistoryEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, StatusHistoryEntry>(
            r#"
            INSERT INTO quotation_status_history (quotation_id, from_status, to_status, actor_id, actor_email, changed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(quotation_id)
        .bind(change.from)
        .bind(change.to)
        .bind(change.actor_id)
        .bind(&change.actor_email)
        .bind(change.changed_at)
        .fetch_one(executor)
        .await?;
        Ok(entry)
    }

    pub async fn history(&self, quotation_id: Uuid) -> Result<Vec<StatusHistoryEntry>, AppError> {
        let entries = sqlx::query_as::<_, StatusHistoryEntry>(
            "SELECT * FROM quotation_status_history WHERE quotation_id = $1 ORDER BY changed_at, id",
        )
        .bind(quotation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    // O histórico cai junto (ON DELETE CASCADE). Pedidos gerados perdem só o vínculo.
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM quotations WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
