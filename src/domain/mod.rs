//! Domain layer: entities, DTOs and the ports the application depends on.

pub mod geo;
pub mod user;

pub use geo::{EnrichmentResult, GeoInfoClient, GeoLookupError};
pub use user::{CreateUserDto, User, UserRepositoryInterface};

pub use crate::shared::{DomainError, DomainResult};
