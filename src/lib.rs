pub mod auth;
pub mod configuration;
pub mod error;
pub mod middleware;
pub mod models;
pub mod moderation;
pub mod repository;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod validators;
