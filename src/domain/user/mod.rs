//! User aggregate
//!
//! Contains the User entity, DTOs, and repository interface.

pub mod model;
pub mod repository;

mod dto_create;

pub use model::User;

pub use dto_create::CreateUserDto;

pub use repository::UserRepositoryInterface;
