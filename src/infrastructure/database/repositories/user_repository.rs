//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use super::{db_err, is_unique_violation};
use crate::domain::user::{NewUser, User, UserRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::user;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        created_at: model.created_at,
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, new_user: NewUser) -> DomainResult<User> {
        debug!("Creating user: {}", new_user.username);
        let now = Utc::now();

        let model = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::Conflict("Username or email already exists".to_string())
            } else {
                db_err(e)
            }
        })?;

        Ok(model_to_domain(inserted))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_login(&self, login: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(
                user::Column::Username
                    .eq(login)
                    .or(user::Column::Email.eq(login)),
            )
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }
}
