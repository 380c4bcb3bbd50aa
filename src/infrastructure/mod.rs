//! Infrastructure layer - external concerns

pub mod database;
pub mod geo;
pub mod storage;

pub use database::{init_database, DatabaseConfig};
pub use geo::IpInfoClient;
pub use storage::InMemoryUserStore;
