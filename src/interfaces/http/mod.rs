//! HTTP REST API interfaces
//!
//! - `common`: shared extractors and the error body
//! - `error`: mapping of domain errors to HTTP responses
//! - `modules`: request handlers grouped by resource
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod error;
pub mod modules;
pub mod router;

pub use error::ApiError;
pub use router::{create_api_router, ApiDoc, RouterDeps};
