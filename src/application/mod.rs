//! Application layer: use cases built on the domain ports

pub mod users;

pub use users::{UserService, DEFAULT_ENRICHMENT_TIMEOUT, USER_ID_KEY};
