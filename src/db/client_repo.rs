// src/db/client_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::map_constraint_error,
    models::client::{Client, ClientPayload},
};

const RESOURCE: &str = "resource.client";

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &ClientPayload) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, company, email, phone, street, postal_code, city, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(payload.name.trim())
        .bind(&payload.company)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.street)
        .bind(&payload.postal_code)
        .bind(&payload.city)
        .bind(&payload.notes)
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, RESOURCE))
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(client)
    }

    /// Lista clientes, opcionalmente filtrando por nome, empresa ou e-mail.
    pub async fn list(&self, query: Option<&str>) -> Result<Vec<Client>, AppError> {
        let pattern = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", q));

        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT * FROM clients
            WHERE $1::text IS NULL
               OR name ILIKE $1
               OR company ILIKE $1
               OR email ILIKE $1
            ORDER BY lower(name)
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(clients)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &ClientPayload) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = $2, company = $3, email = $4, phone = $5,
                street = $6, postal_code = $7, city = $8, notes = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.name.trim())
        .bind(&payload.company)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.street)
        .bind(&payload.postal_code)
        .bind(&payload.city)
        .bind(&payload.notes)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_constraint_error(e, RESOURCE))
    }

    /// Clientes com orçamentos ou pedidos não podem ser removidos (FK RESTRICT).
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| map_constraint_error(e, RESOURCE))?;
        Ok(result.rows_affected() > 0)
    }
}
