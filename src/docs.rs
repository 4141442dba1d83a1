// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::health::health,

        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::users::list_users,
        handlers::users::update_role,
        handlers::users::delete_user,

        // --- Clients ---
        handlers::clients::create_client,
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,

        // --- Products ---
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,

        // --- Quotations ---
        handlers::quotations::create_quotation,
        handlers::quotations::list_quotations,
        handlers::quotations::list_statuses,
        handlers::quotations::get_quotation,
        handlers::quotations::update_details,
        handlers::quotations::update_items,
        handlers::quotations::transition_status,
        handlers::quotations::get_history,
        handlers::quotations::convert_to_order,
        handlers::quotations::delete_quotation,

        // --- Documents ---
        handlers::documents::preview_quotation,
        handlers::documents::print_quotation,
        handlers::documents::quotation_pdf,

        // --- Orders ---
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order,
        handlers::orders::update_order_status,
        handlers::orders::delete_order,

        // --- Dashboard ---
        handlers::dashboard::get_summary,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::UpdateRolePayload,
            models::auth::AuthResponse,

            // --- Pricing ---
            models::pricing::ItemCategory,
            models::pricing::LineItemInput,
            models::pricing::PricedLineItem,
            models::pricing::PricingSummary,

            // --- Clients / Products ---
            models::client::Client,
            models::client::ClientPayload,
            models::product::Product,
            models::product::ProductPayload,

            // --- Quotations ---
            models::quotation::QuotationStatus,
            models::quotation::FulfilmentMode,
            models::quotation::QuotationResponse,
            models::quotation::StatusHistoryEntry,
            models::quotation::StatusInfo,
            models::quotation::CreateQuotationPayload,
            models::quotation::UpdateItemsPayload,
            models::quotation::UpdateDetailsPayload,
            models::quotation::TransitionStatusPayload,

            // --- Documents ---
            services::document_service::DocumentView,

            // --- Orders ---
            models::order::OrderStatus,
            models::order::OrderResponse,
            models::order::OrderPayload,
            models::order::UpdateOrderStatusPayload,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::StatusCount,
            models::dashboard::UpcomingEvent,

            // --- Settings ---
            models::settings::CompanySettings,
            models::settings::UpdateSettingsRequest,
        )
    ),
    tags(
        (name = "Health", description = "Verificação de disponibilidade"),
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Gestão de Acesso"),
        (name = "Clients", description = "Cadastro de Clientes"),
        (name = "Products", description = "Cardápio e Tabela de Preços"),
        (name = "Quotations", description = "Orçamentos e Ciclo de Vida"),
        (name = "Documents", description = "Prévia, Impressão e PDF do Orçamento"),
        (name = "Orders", description = "Pedidos"),
        (name = "Dashboard", description = "Indicadores Gerenciais"),
        (name = "Settings", description = "Dados da Empresa")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
