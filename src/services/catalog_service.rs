// src/services/catalog_service.rs

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProductRepository,
    models::{
        pricing::{LineItem, LineItemInput},
        product::{Product, ProductFilter, ProductPayload},
    },
    services::pricing::build_line_items,
};

#[derive(Clone)]
pub struct CatalogService {
    product_repo: ProductRepository,
    pool: PgPool,
}

impl CatalogService {
    pub fn new(product_repo: ProductRepository, pool: PgPool) -> Self {
        Self { product_repo, pool }
    }

    pub async fn create_product(&self, payload: &ProductPayload) -> Result<Product, AppError> {
        self.product_repo.create(&self.pool, payload).await
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, AppError> {
        self.product_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("resource.product".to_string()))
    }

    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError> {
        self.product_repo.list(filter).await
    }

    pub async fn update_product(&self, id: Uuid, payload: &ProductPayload) -> Result<Product, AppError> {
        self.product_repo
            .update(&self.pool, id, payload)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("resource.product".to_string()))
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), AppError> {
        if !self.product_repo.delete(&self.pool, id).await? {
            return Err(AppError::ResourceNotFound("resource.product".to_string()));
        }
        tracing::info!("Produto {} removido do catálogo", id);
        Ok(())
    }

    /// Transforma o payload em posições definitivas, buscando no catálogo
    /// (numa única consulta) os produtos referenciados.
    pub async fn resolve_line_items(
        &self,
        conn: &mut PgConnection,
        inputs: &[LineItemInput],
    ) -> Result<Vec<LineItem>, AppError> {
        let mut ids: Vec<Uuid> = inputs.iter().filter_map(|i| i.product_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let catalog: HashMap<Uuid, Product> = self
            .product_repo
            .find_by_ids(&mut *conn, &ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(build_line_items(inputs, &catalog)?)
    }
}
