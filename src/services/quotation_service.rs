// src/services/quotation_service.rs

use chrono::{DateTime, Datelike, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{next_document_number, ClientRepository, OrderRepository, QuotationRepository, ORDER_PREFIX, QUOTATION_PREFIX},
    models::{
        auth::CurrentUser,
        order::{Order, OrderStatus},
        quotation::{
            CreateQuotationPayload, Quotation, QuotationFilter, QuotationStatus, StatusHistoryEntry,
            UpdateDetailsPayload, UpdateItemsPayload,
        },
    },
    services::{
        catalog_service::CatalogService,
        pricing::{compute_summary, validate_tax_rate},
    },
};

#[derive(Clone)]
pub struct QuotationService {
    repo: QuotationRepository,
    client_repo: ClientRepository,
    order_repo: OrderRepository,
    catalog: CatalogService,
    pool: PgPool,
    default_tax_rate: Decimal,
    validity_days: i64,
}

impl QuotationService {
    pub fn new(
        repo: QuotationRepository,
        client_repo: ClientRepository,
        order_repo: OrderRepository,
        catalog: CatalogService,
        pool: PgPool,
        default_tax_rate: Decimal,
        validity_days: i64,
    ) -> Self {
        Self { repo, client_repo, order_repo, catalog, pool, default_tax_rate, validity_days }
    }

    pub async fn create(
        &self,
        payload: &CreateQuotationPayload,
        actor: &CurrentUser,
        now: DateTime<Utc>,
    ) -> Result<Quotation, AppError> {
        // Validação pura antes de abrir conexão
        let tax_rate = payload.tax_rate.unwrap_or(self.default_tax_rate);
        validate_tax_rate(tax_rate)?;

        let mut tx = self.pool.begin().await?;

        self.ensure_client_exists(&mut tx, payload.client_id).await?;

        let items = self.catalog.resolve_line_items(&mut tx, &payload.items).await?;
        let pricing = compute_summary(&items, tax_rate, payload.deposit_amount, payload.deposit_due_date)?;
        let number = next_document_number(&mut *tx, QUOTATION_PREFIX, now.year()).await?;

        let draft = Quotation {
            id: Uuid::new_v4(),
            number,
            client_id: payload.client_id,
            event_name: payload.event_name.trim().to_string(),
            event_date: payload.event_date,
            start_time: payload.start_time,
            end_time: payload.end_time,
            location: payload.location.clone(),
            address: payload.address.clone(),
            guest_count: payload.guest_count,
            fulfilment: payload.fulfilment,
            notes: payload.notes.clone(),
            items,
            pricing,
            status: QuotationStatus::Draft,
            valid_until: payload
                .valid_until
                .unwrap_or_else(|| now.date_naive() + Duration::days(self.validity_days)),
            version: 1,
            created_by: Some(actor.id),
            created_at: now,
            updated_at: now,
        };

        let saved = self.repo.insert(&mut *tx, &draft).await?;
        tx.commit().await?;

        tracing::info!("Orçamento {} criado por {}", saved.number, actor.email);
        Ok(saved)
    }

    pub async fn get(&self, id: Uuid) -> Result<Quotation, AppError> {
        self.repo.find_by_id(&self.pool, id).await?.ok_or_else(not_found)
    }

    /// Lista filtrando pelo status efetivo em `now` (permite buscar "expired").
    pub async fn list(&self, filter: &QuotationFilter, now: DateTime<Utc>) -> Result<Vec<Quotation>, AppError> {
        let quotations = self.repo.list(filter.client_id).await?;
        Ok(filter_by_status(quotations, filter.status, now))
    }

    pub async fn update_items(
        &self,
        id: Uuid,
        payload: &UpdateItemsPayload,
        now: DateTime<Utc>,
    ) -> Result<Quotation, AppError> {
        if let Some(tax_rate) = payload.tax_rate {
            validate_tax_rate(tax_rate)?;
        }

        let mut tx = self.pool.begin().await?;
        let current = self.load(&mut tx, id).await?;

        current.ensure_items_editable(now)?;
        ensure_version(&current, payload.version)?;

        let items = self.catalog.resolve_line_items(&mut tx, &payload.items).await?;
        let tax_rate = payload.tax_rate.unwrap_or(current.pricing.tax_rate);
        let pricing = compute_summary(&items, tax_rate, payload.deposit_amount, payload.deposit_due_date)?;

        let updated = match self.repo.update_items(&mut *tx, id, payload.version, &items, &pricing).await? {
            Some(q) => q,
            None => return Err(self.version_conflict(&mut tx, id, payload.version).await),
        };
        tx.commit().await?;

        Ok(updated)
    }

    pub async fn update_details(&self, id: Uuid, payload: &UpdateDetailsPayload) -> Result<Quotation, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut quotation = self.load(&mut tx, id).await?;

        quotation.ensure_details_editable()?;
        ensure_version(&quotation, payload.version)?;

        if quotation.client_id != payload.client_id {
            self.ensure_client_exists(&mut tx, payload.client_id).await?;
        }
        payload.apply_to(&mut quotation);

        let updated = match self.repo.update_details(&mut *tx, &quotation, payload.version).await? {
            Some(q) => q,
            None => return Err(self.version_conflict(&mut tx, id, payload.version).await),
        };
        tx.commit().await?;

        Ok(updated)
    }

    /// Aplica uma transição e grava o histórico na mesma transação.
    pub async fn transition_status(
        &self,
        id: Uuid,
        version: i32,
        to: QuotationStatus,
        actor: &CurrentUser,
        now: DateTime<Utc>,
    ) -> Result<Quotation, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut quotation = self.load(&mut tx, id).await?;

        ensure_version(&quotation, version)?;
        let change = quotation.apply_transition(to, actor, now)?;

        let updated = match self.repo.update_status(&mut *tx, id, version, change.to).await? {
            Some(q) => q,
            None => return Err(self.version_conflict(&mut tx, id, version).await),
        };
        self.repo.insert_history(&mut *tx, id, &change).await?;
        tx.commit().await?;

        tracing::info!(
            "Orçamento {}: {:?} -> {:?} por {}",
            updated.number,
            change.from,
            change.to,
            actor.email
        );
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid, actor: &CurrentUser) -> Result<(), AppError> {
        if !self.repo.delete(&self.pool, id).await? {
            return Err(not_found());
        }
        tracing::info!("Orçamento {} removido por {}", id, actor.email);
        Ok(())
    }

    pub async fn history(&self, id: Uuid) -> Result<Vec<StatusHistoryEntry>, AppError> {
        self.get(id).await?;
        self.repo.history(id).await
    }

    /// Gera o pedido de um orçamento aceito. Cada orçamento vira no máximo um pedido.
    pub async fn convert_to_order(&self, id: Uuid, actor: &CurrentUser, now: DateTime<Utc>) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;
        let quotation = self.load(&mut tx, id).await?;

        quotation.ensure_accepted(now)?;
        if self.order_repo.find_by_quotation(&mut *tx, id).await?.is_some() {
            return Err(AppError::UniqueConstraintViolation("resource.order".to_string()));
        }

        let number = next_document_number(&mut *tx, ORDER_PREFIX, now.year()).await?;
        let order = order_from_quotation(&quotation, number, actor, now);
        let saved = self.order_repo.insert(&mut *tx, &order).await?;
        tx.commit().await?;

        tracing::info!("Pedido {} gerado do orçamento {}", saved.number, quotation.number);
        Ok(saved)
    }

    async fn load(&self, conn: &mut PgConnection, id: Uuid) -> Result<Quotation, AppError> {
        self.repo.find_by_id(conn, id).await?.ok_or_else(not_found)
    }

    async fn ensure_client_exists(&self, conn: &mut PgConnection, client_id: Uuid) -> Result<(), AppError> {
        match self.client_repo.find_by_id(conn, client_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::ResourceNotFound("resource.client".to_string())),
        }
    }

    // O compare-and-swap falhou: outra gravação chegou entre a leitura e a escrita.
    async fn version_conflict(&self, conn: &mut PgConnection, id: Uuid, expected: i32) -> AppError {
        match self.repo.find_by_id(conn, id).await {
            Ok(Some(q)) => {
                tracing::warn!("Conflito de versão no orçamento {}: esperada {}, atual {}", q.number, expected, q.version);
                AppError::VersionConflict { expected, current: q.version }
            }
            Ok(None) => not_found(),
            Err(e) => e,
        }
    }
}

fn not_found() -> AppError {
    AppError::ResourceNotFound("resource.quotation".to_string())
}

fn ensure_version(quotation: &Quotation, expected: i32) -> Result<(), AppError> {
    if quotation.version != expected {
        tracing::warn!(
            "Versão desatualizada no orçamento {}: recebida {}, atual {}",
            quotation.number,
            expected,
            quotation.version
        );
        return Err(AppError::VersionConflict { expected, current: quotation.version });
    }
    Ok(())
}

fn filter_by_status(quotations: Vec<Quotation>, status: Option<QuotationStatus>, now: DateTime<Utc>) -> Vec<Quotation> {
    match status {
        Some(wanted) => quotations.into_iter().filter(|q| q.effective_status(now) == wanted).collect(),
        None => quotations,
    }
}

// Copia cliente, posições, preços e dados de entrega. O evento vira a data de entrega.
fn order_from_quotation(quotation: &Quotation, number: String, actor: &CurrentUser, now: DateTime<Utc>) -> Order {
    Order {
        id: Uuid::new_v4(),
        number,
        client_id: quotation.client_id,
        quotation_id: Some(quotation.id),
        items: quotation.items.clone(),
        pricing: quotation.pricing.clone(),
        status: OrderStatus::Pending,
        fulfilment: quotation.fulfilment,
        delivery_date: quotation.event_date,
        delivery_time: quotation.start_time,
        delivery_address: quotation.address.clone().or_else(|| quotation.location.clone()),
        notes: quotation.notes.clone(),
        created_by: Some(actor.id),
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        auth::UserRole,
        pricing::{ItemCategory, LineItem, PricingSummary},
        quotation::FulfilmentMode,
    };
    use chrono::NaiveDate;

    fn actor() -> CurrentUser {
        CurrentUser { id: Uuid::new_v4(), email: "vertrieb@catering.de".to_string(), role: UserRole::User }
    }

    fn quotation(status: QuotationStatus, valid_until: NaiveDate) -> Quotation {
        let now = Utc::now();
        Quotation {
            id: Uuid::new_v4(),
            number: "ANG-2024-003".to_string(),
            client_id: Uuid::new_v4(),
            event_name: "Firmenjubiläum".to_string(),
            event_date: NaiveDate::from_ymd_opt(2024, 9, 20),
            start_time: None,
            end_time: None,
            location: Some("Zeche Zollverein".to_string()),
            address: None,
            guest_count: Some(150),
            fulfilment: FulfilmentMode::DeliveryWithStaff,
            notes: None,
            items: vec![LineItem {
                id: Uuid::new_v4(),
                product_id: None,
                category: ItemCategory::Food,
                name: "Flying Buffet".to_string(),
                description: None,
                quantity: Decimal::from(150),
                unit: "Person".to_string(),
                unit_price: Decimal::from(32),
            }],
            pricing: PricingSummary {
                subtotal: Decimal::from(4800),
                tax_rate: Decimal::from(19),
                tax_amount: Decimal::from(912),
                total: Decimal::from(5712),
                deposit_amount: None,
                deposit_due_date: None,
            },
            status,
            valid_until,
            version: 4,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn stale_version_is_a_conflict() {
        let q = quotation(QuotationStatus::Draft, Utc::now().date_naive());

        assert!(ensure_version(&q, 4).is_ok());
        assert!(matches!(
            ensure_version(&q, 3),
            Err(AppError::VersionConflict { expected: 3, current: 4 })
        ));
    }

    #[test]
    fn status_filter_uses_effective_status() {
        let today = Utc::now().date_naive();
        let list = vec![
            quotation(QuotationStatus::Draft, today - Duration::days(3)),
            quotation(QuotationStatus::Draft, today + Duration::days(3)),
            quotation(QuotationStatus::Accepted, today - Duration::days(3)),
        ];

        let expired = filter_by_status(list.clone(), Some(QuotationStatus::Expired), Utc::now());
        let drafts = filter_by_status(list.clone(), Some(QuotationStatus::Draft), Utc::now());

        assert_eq!(expired.len(), 1);
        assert_eq!(drafts.len(), 1);
        assert_eq!(filter_by_status(list, None, Utc::now()).len(), 3);
    }

    #[test]
    fn order_copies_items_pricing_and_event_data() {
        let q = quotation(QuotationStatus::Accepted, Utc::now().date_naive());
        let who = actor();

        let order = order_from_quotation(&q, "AUF-2024-001".to_string(), &who, Utc::now());

        assert_eq!(order.quotation_id, Some(q.id));
        assert_eq!(order.client_id, q.client_id);
        assert_eq!(order.items, q.items);
        assert_eq!(order.pricing, q.pricing);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.delivery_date, q.event_date);
        assert_eq!(order.delivery_address.as_deref(), Some("Zeche Zollverein"));
        assert_eq!(order.created_by, Some(who.id));
    }
}
