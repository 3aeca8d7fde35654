//! Bootstrap for the subgate server
//!
//! This module handles:
//! - Configuration loading
//! - Database initialization
//! - Service wiring and the initial policy load

pub mod config;
pub mod database;
pub mod services;

pub use config::load_config;
pub use database::init_database;
pub use services::{init_services, Services};
