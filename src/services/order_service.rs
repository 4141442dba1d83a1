// src/services/order_service.rs

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{next_document_number, ClientRepository, OrderRepository, ORDER_PREFIX},
    models::{
        auth::CurrentUser,
        order::{Order, OrderFilter, OrderPayload, OrderStatus},
    },
    services::{
        catalog_service::CatalogService,
        pricing::{compute_summary, validate_tax_rate},
    },
};

#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
    client_repo: ClientRepository,
    catalog: CatalogService,
    pool: PgPool,
    default_tax_rate: Decimal,
}

impl OrderService {
    pub fn new(
        repo: OrderRepository,
        client_repo: ClientRepository,
        catalog: CatalogService,
        pool: PgPool,
        default_tax_rate: Decimal,
    ) -> Self {
        Self { repo, client_repo, catalog, pool, default_tax_rate }
    }

    pub async fn create(&self, payload: &OrderPayload, actor: &CurrentUser, now: DateTime<Utc>) -> Result<Order, AppError> {
        let tax_rate = payload.tax_rate.unwrap_or(self.default_tax_rate);
        validate_tax_rate(tax_rate)?;

        let mut tx = self.pool.begin().await?;
        self.ensure_client_exists(&mut tx, payload.client_id).await?;

        let items = self.catalog.resolve_line_items(&mut tx, &payload.items).await?;
        let pricing = compute_summary(&items, tax_rate, None, None)?;
        let number = next_document_number(&mut *tx, ORDER_PREFIX, now.year()).await?;

        let order = Order {
            id: Uuid::new_v4(),
            number,
            client_id: payload.client_id,
            quotation_id: None,
            items,
            pricing,
            status: OrderStatus::Pending,
            fulfilment: payload.fulfilment,
            delivery_date: payload.delivery_date,
            delivery_time: payload.delivery_time,
            delivery_address: payload.delivery_address.clone(),
            notes: payload.notes.clone(),
            created_by: Some(actor.id),
            created_at: now,
            updated_at: now,
        };

        let saved = self.repo.insert(&mut *tx, &order).await?;
        tx.commit().await?;

        tracing::info!("Pedido {} criado por {}", saved.number, actor.email);
        Ok(saved)
    }

    pub async fn get(&self, id: Uuid) -> Result<Order, AppError> {
        self.repo.find_by_id(&self.pool, id).await?.ok_or_else(not_found)
    }

    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, AppError> {
        self.repo.list(filter).await
    }

    /// Substitui dados e posições, reprecificando. Um sinal herdado do orçamento é mantido.
    pub async fn update(&self, id: Uuid, payload: &OrderPayload) -> Result<Order, AppError> {
        if let Some(tax_rate) = payload.tax_rate {
            validate_tax_rate(tax_rate)?;
        }

        let mut tx = self.pool.begin().await?;
        let mut order = self.repo.find_by_id(&mut *tx, id).await?.ok_or_else(not_found)?;

        if order.client_id != payload.client_id {
            self.ensure_client_exists(&mut tx, payload.client_id).await?;
        }

        let items = self.catalog.resolve_line_items(&mut tx, &payload.items).await?;
        let tax_rate = payload.tax_rate.unwrap_or(order.pricing.tax_rate);
        order.pricing = compute_summary(&items, tax_rate, order.pricing.deposit_amount, order.pricing.deposit_due_date)?;
        order.items = items;
        order.client_id = payload.client_id;
        order.fulfilment = payload.fulfilment;
        order.delivery_date = payload.delivery_date;
        order.delivery_time = payload.delivery_time;
        order.delivery_address = payload.delivery_address.clone();
        order.notes = payload.notes.clone();

        let updated = self.repo.update(&mut *tx, &order).await?.ok_or_else(not_found)?;
        tx.commit().await?;

        Ok(updated)
    }

    // Status de pedido é livre: a cozinha pode voltar uma etapa.
    pub async fn update_status(&self, id: Uuid, status: OrderStatus, actor: &CurrentUser) -> Result<Order, AppError> {
        let order = self
            .repo
            .update_status(&self.pool, id, status)
            .await?
            .ok_or_else(not_found)?;
        tracing::info!("Pedido {} -> {:?} por {}", order.number, status, actor.email);
        Ok(order)
    }

    pub async fn delete(&self, id: Uuid, actor: &CurrentUser) -> Result<(), AppError> {
        if !self.repo.delete(&self.pool, id).await? {
            return Err(not_found());
        }
        tracing::info!("Pedido {} removido por {}", id, actor.email);
        Ok(())
    }

    async fn ensure_client_exists(&self, conn: &mut PgConnection, client_id: Uuid) -> Result<(), AppError> {
        match self.client_repo.find_by_id(conn, client_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::ResourceNotFound("resource.client".to_string())),
        }
    }
}

fn not_found() -> AppError {
    AppError::ResourceNotFound("resource.order".to_string())
}
