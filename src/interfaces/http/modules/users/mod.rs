//! Users module: registration and user CRUD

pub mod dto;
pub mod handlers;

#[cfg(test)]
mod tests;

pub use dto::*;
pub use handlers::*;
