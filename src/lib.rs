pub mod constants;
pub mod error;
pub mod ids;
pub mod logging;

pub mod config;
pub mod domain;
pub mod pipeline;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;
