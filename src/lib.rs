//! # User Geo Service
//!
//! REST service for user CRUD that enriches every registration with
//! geolocation metadata of the caller's IP address.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Core entities, DTOs and the ports the service depends on
//! - **application**: Registration workflow and user management
//! - **infrastructure**: SeaORM store, in-memory store, ipinfo HTTP client
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: Lifecycle of a running instance

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export API router
pub use interfaces::http::create_api_router;
