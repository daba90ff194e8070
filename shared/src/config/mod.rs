pub mod cluster_config;
pub mod error;
mod millis;
