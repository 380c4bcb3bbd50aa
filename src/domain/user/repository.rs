use async_trait::async_trait;

use super::{CreateUserDto, User};
use crate::domain::DomainResult;

/// Persistence port for [`User`] records.
///
/// `get_user_by_id` and `update_user` report a missing id as
/// `DomainError::NotFound`. `delete_user` treats a missing id as success.
#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// Insert a new row and return the id the store assigned to it.
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<i64>;

    async fn list_users(&self) -> DomainResult<Vec<User>>;
    async fn get_user_by_id(&self, id: i64) -> DomainResult<User>;

    /// Replace name and email of the record identified by `user.id`.
    async fn update_user(&self, user: User) -> DomainResult<()>;
    async fn delete_user(&self, id: i64) -> DomainResult<()>;
}
