pub mod auth;
pub mod catalog_service;
pub mod client_service;
pub mod dashboard_service;
pub mod document_render;
pub mod document_service;
pub mod order_service;
pub mod pricing;
pub mod quotation_service;
