pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod documents;
pub mod health;
pub mod orders;
pub mod products;
pub mod quotations;
pub mod settings;
pub mod users;
