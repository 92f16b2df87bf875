pub mod auth;
pub mod browse;
pub mod config;
