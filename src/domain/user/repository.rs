use async_trait::async_trait;

use super::model::{NewUser, User};
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the username or email is taken.
    async fn create(&self, user: NewUser) -> DomainResult<User>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>>;
    /// Matches either the username or the email.
    async fn find_by_login(&self, login: &str) -> DomainResult<Option<User>>;
}
