// src/db/order_repo.rs

use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::order::{Order, OrderFilter, OrderStatus},
};

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(&self, executor: E, o: &Order) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                id, number, client_id, quotation_id, items,
                subtotal, tax_rate, tax_amount, total, deposit_amount, deposit_due_date,
                status, fulfilment, delivery_date, delivery_time, delivery_address, notes, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(o.id)
        .bind(&o.number)
        .bind(o.client_id)
        .bind(o.quotation_id)
        .bind(Json(&o.items))
        .bind(o.pricing.subtotal)
        .bind(o.pricing.tax_rate)
        .bind(o.pricing.tax_amount)
        .bind(o.pricing.total)
        .bind(o.pricing.deposit_amount)
        .bind(o.pricing.deposit_due_date)
        .bind(o.status)
        .bind(o.fulfilment)
        .bind(o.delivery_date)
        .bind(o.delivery_time)
        .bind(&o.delivery_address)
        .bind(&o.notes)
        .bind(o.created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                // um pedido por orçamento
                if db_err.constraint() == Some("orders_quotation_id_key") {
                    return AppError::UniqueConstraintViolation("resource.order".to_string());
                }
            }
            e.into()
        })
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    pub async fn find_by_quotation<'e, E>(&self, executor: E, quotation_id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE quotation_id = $1")
            .bind(quotation_id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE ($1::order_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR client_id = $2)
            ORDER BY delivery_date NULLS LAST, created_at DESC
            "#,
        )
        .bind(filter.status)
        .bind(filter.client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    // Sobrescreve dados e posições. Status e vínculo com o orçamento ficam como estão.
    pub async fn update<'e, E>(&self, executor: E, o: &Order) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET client_id = $2, items = $3,
                subtotal = $4, tax_rate = $5, tax_amount = $6, total = $7,
                deposit_amount = $8, deposit_due_date = $9,
                fulfilment = $10, delivery_date = $11, delivery_time = $12,
                delivery_address = $13, notes = $14, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(o.id)
        .bind(o.client_id)
        .bind(Json(&o.items))
        .bind(o.pricing.subtotal)
        .bind(o.pricing.tax_rate)
        .bind(o.pricing.tax_amount)
        .bind(o.pricing.total)
        .bind(o.pricing.deposit_amount)
        .bind(o.pricing.deposit_due_date)
        .bind(o.fulfilment)
        .bind(o.delivery_date)
        .bind(o.delivery_time)
        .bind(&o.delivery_address)
        .bind(&o.notes)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    pub async fn update_status<'e, E>(&self, executor: E, id: Uuid, status: OrderStatus) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
