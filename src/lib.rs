#![doc = "The `taskvault` library crate."]
#![doc = ""]
#![doc = "This crate contains the core business logic, domain models, authentication"]
#![doc = "and session mechanisms, routing configuration, pagination, and error"]
#![doc = "handling for the taskvault application. It is used by the main binary"]
#![doc = "(`main.rs`) to construct and run the application."]

pub mod auth;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod pagination;
pub mod routes;
