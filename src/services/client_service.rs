// src/services/client_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ClientRepository,
    models::client::{Client, ClientPayload},
};

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
    pool: PgPool,
}

impl ClientService {
    pub fn new(repo: ClientRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn create(&self, payload: &ClientPayload) -> Result<Client, AppError> {
        self.repo.create(&self.pool, payload).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Client, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("resource.client".to_string()))
    }

    pub async fn list(&self, query: Option<&str>) -> Result<Vec<Client>, AppError> {
        self.repo.list(query).await
    }

    pub async fn update(&self, id: Uuid, payload: &ClientPayload) -> Result<Client, AppError> {
        self.repo
            .update(&self.pool, id, payload)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("resource.client".to_string()))
    }

    /// Falha com 409 enquanto houver orçamentos ou pedidos do cliente.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(&self.pool, id).await? {
            return Err(AppError::ResourceNotFound("resource.client".to_string()));
        }
        tracing::info!("Cliente {} removido", id);
        Ok(())
    }
}
