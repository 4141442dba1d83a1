// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        ClientRepository, DashboardRepository, OrderRepository, ProductRepository, QuotationRepository,
        SettingsRepository, UserRepository,
    },
    services::{
        auth::AuthService, catalog_service::CatalogService, client_service::ClientService,
        dashboard_service::DashboardService, document_service::DocumentService, order_service::OrderService,
        quotation_service::QuotationService,
    },
};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub jwt_ttl_days: i64,
    pub default_tax_rate: Decimal,
    pub quotation_validity_days: i64,
    pub pdf_font_dir: String,
    pub pdf_font_family: String,
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            jwt_ttl_days: parse_var("JWT_TTL_DAYS", 7)?,
            default_tax_rate: parse_var("DEFAULT_TAX_RATE", Decimal::from(19))?,
            quotation_validity_days: parse_var("QUOTATION_VALIDITY_DAYS", 30)?,
            pdf_font_dir: env::var("PDF_FONT_DIR").unwrap_or_else(|_| "./fonts".to_string()),
            pdf_font_family: env::var("PDF_FONT_FAMILY").unwrap_or_else(|_| "Roboto".to_string()),
            cors_origin: env::var("CORS_ORIGIN").ok().filter(|v| !v.trim().is_empty()),
        })
    }
}

// Variável opcional: ausente usa o padrão, presente e inválida é erro.
fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} inválida ({}): {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub client_service: ClientService,
    pub catalog_service: CatalogService,
    pub quotation_service: QuotationService,
    pub order_service: OrderService,
    pub document_service: DocumentService,
    pub dashboard_service: DashboardService,
    pub settings_repo: SettingsRepository,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::with_pool(config, db_pool)
    }

    /// Monta o gráfico de dependências sobre um pool já criado (os testes usam um pool preguiçoso).
    pub fn with_pool(config: Config, db_pool: PgPool) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::load()?);

        let user_repo = UserRepository::new(db_pool.clone());
        let client_repo = ClientRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let quotation_repo = QuotationRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, config.jwt_secret.clone(), config.jwt_ttl_days, db_pool.clone());
        let client_service = ClientService::new(client_repo.clone(), db_pool.clone());
        let catalog_service = CatalogService::new(product_repo, db_pool.clone());
        let quotation_service = QuotationService::new(
            quotation_repo.clone(),
            client_repo.clone(),
            order_repo.clone(),
            catalog_service.clone(),
            db_pool.clone(),
            config.default_tax_rate,
            config.quotation_validity_days,
        );
        let order_service = OrderService::new(
            order_repo,
            client_repo.clone(),
            catalog_service.clone(),
            db_pool.clone(),
            config.default_tax_rate,
        );
        let document_service = DocumentService::new(
            quotation_repo,
            client_repo,
            settings_repo.clone(),
            i18n_store.clone(),
            config.pdf_font_dir.clone(),
            config.pdf_font_family.clone(),
            db_pool.clone(),
        );
        let dashboard_service = DashboardService::new(dashboard_repo);

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            i18n_store,
            auth_service,
            client_service,
            catalog_service,
            quotation_service,
            order_service,
            document_service,
            dashboard_service,
            settings_repo,
        })
    }
}
