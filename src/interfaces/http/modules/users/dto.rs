//! User DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{CreateUserDto, EnrichmentResult, User};

/// User API representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
        }
    }
}

/// Body of `POST /users` and `PUT /users/{id}`.
///
/// An `id` field in the body is ignored; the path decides which user is
/// updated.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UserPayload {
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    #[schema(min_length = 2, example = "Aren")]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    #[schema(example = "aren@example.com")]
    pub email: String,
}

impl UserPayload {
    pub fn into_create_dto(self) -> CreateUserDto {
        CreateUserDto {
            name: self.name,
            email: self.email,
        }
    }

    pub fn into_user(self, id: i64) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
        }
    }
}

/// Location metadata of the caller's IP plus the new id under `usedId`.
/// Holds `{"enrichment": "unavailable"}` instead of location data when the
/// lookup failed.
#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object, example = json!({"city": "Berlin", "country": "DE", "usedId": 1}))]
pub struct RegisteredUserResponse(pub EnrichmentResult);
