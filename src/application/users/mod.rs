//! Users module: registration and user management
//!
//! Contains the `UserService` which orchestrates the registration workflow
//! (geo enrichment + persistence) and the pass-through management use-cases.

pub mod service;

pub use service::{
    UserService, DEFAULT_ENRICHMENT_TIMEOUT, ENRICHMENT_STATUS_KEY, ENRICHMENT_UNAVAILABLE,
    USER_ID_KEY,
};
