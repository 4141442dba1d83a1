// src/db/product_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::map_constraint_error,
    models::product::{Product, ProductFilter, ProductPayload},
};

const RESOURCE: &str = "resource.product";

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &ProductPayload) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, description, category, unit, price, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(payload.name.trim())
        .bind(&payload.description)
        .bind(payload.category)
        .bind(payload.unit.trim())
        .bind(payload.price)
        .bind(payload.active)
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, RESOURCE))
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    // Usado para completar as posições: uma consulta só para todos os produtos referenciados.
    pub async fn find_by_ids<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(executor)
            .await?;
        Ok(products)
    }

    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE ($1::item_category IS NULL OR category = $1)
              AND ($2::boolean IS NULL OR active = $2)
            ORDER BY category, lower(name)
            "#,
        )
        .bind(filter.category)
        .bind(filter.active)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &ProductPayload) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, description = $3, category = $4, unit = $5,
                price = $6, active = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.name.trim())
        .bind(&payload.description)
        .bind(payload.category)
        .bind(payload.unit.trim())
        .bind(payload.price)
        .bind(payload.active)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_constraint_error(e, RESOURCE))
    }

    // Posições já gravadas guardam uma cópia dos dados, então apagar o produto não as afeta.
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
