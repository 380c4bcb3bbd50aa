use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, User, UserRepositoryInterface,
};
use crate::infrastructure::database::entities::user;

/// SeaORM-backed user store
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(e.to_string())
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for UserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<i64> {
        let new_user = user::ActiveModel {
            name: Set(dto.name),
            email: Set(dto.email),
            ..Default::default()
        };

        let result = user::Entity::insert(new_user)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.last_insert_id)
    }

    async fn list_users(&self) -> DomainResult<Vec<User>> {
        let models = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().map(user_model_to_domain).collect())
    }

    async fn get_user_by_id(&self, id: i64) -> DomainResult<User> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(user_model_to_domain)
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    async fn update_user(&self, u: User) -> DomainResult<()> {
        // Single statement: a row deleted concurrently shows up as zero rows
        // affected rather than a failed read-then-write.
        let result = user::Entity::update_many()
            .col_expr(user::Column::Name, Expr::value(u.name))
            .col_expr(user::Column::Email, Expr::value(u.email))
            .filter(user::Column::Id.eq(u.id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::user_not_found(u.id));
        }

        Ok(())
    }

    async fn delete_user(&self, id: i64) -> DomainResult<()> {
        let result = user::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            debug!(user_id = id, "Delete matched no rows");
        }

        Ok(())
    }
}
