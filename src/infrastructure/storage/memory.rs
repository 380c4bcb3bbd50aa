//! In-memory user store

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{CreateUserDto, DomainError, DomainResult, User, UserRepositoryInterface};

/// In-memory user store for development and testing
pub struct InMemoryUserStore {
    users: DashMap<i64, User>,
    id_counter: AtomicI64,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            id_counter: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserStore {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<i64> {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        self.users.insert(id, User::new(id, dto.name, dto.email));
        Ok(id)
    }

    async fn list_users(&self) -> DomainResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn get_user_by_id(&self, id: i64) -> DomainResult<User> {
        self.users
            .get(&id)
            .map(|e| e.value().clone())
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    async fn update_user(&self, user: User) -> DomainResult<()> {
        match self.users.get_mut(&user.id) {
            Some(mut entry) => {
                *entry = user;
                Ok(())
            }
            None => Err(DomainError::user_not_found(user.id)),
        }
    }

    async fn delete_user(&self, id: i64) -> DomainResult<()> {
        self.users.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(name: &str) -> CreateUserDto {
        CreateUserDto {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    #[tokio::test]
    async fn ids_are_unique_and_listing_is_ordered() {
        let store = InMemoryUserStore::new();
        for name in ["Aren", "Bea", "Cid"] {
            store.create_user(dto(name)).await.unwrap();
        }

        let ids: Vec<i64> = store
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = InMemoryUserStore::new();
        let first = store.create_user(dto("Aren")).await.unwrap();
        store.delete_user(first).await.unwrap();

        let second = store.create_user(dto("Bea")).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn update_of_missing_user_fails() {
        let store = InMemoryUserStore::new();
        let err = store
            .update_user(User::new(5, "Nobody", "nobody@example.com"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(store.is_empty());
    }
}
