pub mod config;
mod config_env;
pub mod gating;
pub mod llm;
pub mod models;
pub mod repos;
