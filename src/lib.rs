// src/lib.rs

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    handler::Handler,
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    middleware::auth::{admin_guard, auth_guard},
};

/// Monta todas as rotas. Separado do main para os testes de integração.
pub fn build_router(app_state: AppState) -> Router {
    let admin = axum_middleware::from_fn_with_state(app_state.clone(), admin_guard);

    // Rotas públicas
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // O route_layer só vale para as rotas declaradas antes dele.
    let user_routes = Router::new()
        .route("/", get(handlers::users::list_users))
        .route("/{id}", axum::routing::delete(handlers::users::delete_user))
        .route("/{id}/role", patch(handlers::users::update_role))
        .route_layer(admin.clone())
        .route("/me", get(handlers::auth::get_me));

    let client_routes = Router::new()
        .route(
            "/",
            post(handlers::clients::create_client).get(handlers::clients::list_clients),
        )
        .route(
            "/{id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        );

    let product_routes = Router::new()
        .route(
            "/",
            post(handlers::products::create_product).get(handlers::products::list_products),
        )
        .route(
            "/{id}",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        );

    let quotation_routes = Router::new()
        .route(
            "/",
            post(handlers::quotations::create_quotation).get(handlers::quotations::list_quotations),
        )
        .route("/statuses", get(handlers::quotations::list_statuses))
        .route(
            "/{id}",
            get(handlers::quotations::get_quotation)
                .put(handlers::quotations::update_details)
                .delete(handlers::quotations::delete_quotation),
        )
        .route("/{id}/items", put(handlers::quotations::update_items))
        .route("/{id}/status", patch(handlers::quotations::transition_status))
        .route("/{id}/history", get(handlers::quotations::get_history))
        .route("/{id}/order", post(handlers::quotations::convert_to_order))
        .route("/{id}/preview", get(handlers::documents::preview_quotation))
        .route("/{id}/print", get(handlers::documents::print_quotation))
        .route("/{id}/pdf", get(handlers::documents::quotation_pdf));

    let order_routes = Router::new()
        .route(
            "/",
            post(handlers::orders::create_order).get(handlers::orders::list_orders),
        )
        .route(
            "/{id}",
            get(handlers::orders::get_order)
                .put(handlers::orders::update_order)
                .delete(handlers::orders::delete_order),
        )
        .route("/{id}/status", patch(handlers::orders::update_order_status));

    // Leitura para todos, escrita só para admin
    let settings_routes = Router::new().route(
        "/",
        get(handlers::settings::get_settings).put(handlers::settings::update_settings.layer(admin)),
    );

    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/clients", client_routes)
        .nest("/products", product_routes)
        .nest("/quotations", quotation_routes)
        .nest("/orders", order_routes)
        .nest("/settings", settings_routes)
        .route("/dashboard/summary", get(handlers::dashboard::get_summary))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let cors = cors_layer(app_state.config.cors_origin.as_deref());

    Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.map(str::parse::<HeaderValue>) {
        Some(Ok(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Some(Err(_)) => {
            tracing::warn!("CORS_ORIGIN inválida, usando CORS permissivo");
            CorsLayer::permissive()
        }
        None => CorsLayer::permissive(),
    }
}
