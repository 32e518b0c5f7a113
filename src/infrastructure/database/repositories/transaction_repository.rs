//! SeaORM implementation of TransactionRepository (read side)

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use super::db_err;
use crate::domain::rental::{Transaction, TransactionRepository, TransactionStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::transaction;

pub struct SeaOrmTransactionRepository {
    db: DatabaseConnection,
}

impl SeaOrmTransactionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn model_to_domain(t: transaction::Model) -> DomainResult<Transaction> {
    let status = TransactionStatus::from_str(&t.status).ok_or_else(|| {
        DomainError::DataInconsistency(format!(
            "transaction {} has unknown status '{}'",
            t.id, t.status
        ))
    })?;
    Ok(Transaction {
        id: t.id,
        user_id: t.user_id,
        powerbank_id: t.powerbank_id,
        origin_station_id: t.origin_station_id,
        return_station_id: t.return_station_id,
        status,
        order_id: t.order_id,
        payment_token: t.payment_token,
        payment_redirect_url: t.payment_redirect_url,
        amount: t.amount,
        created_at: t.created_at,
        updated_at: t.updated_at,
        date_returned: t.date_returned,
    })
}

#[async_trait]
impl TransactionRepository for SeaOrmTransactionRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Transaction>> {
        transaction::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_by_order_id(&self, order_id: &str) -> DomainResult<Option<Transaction>> {
        transaction::Entity::find()
            .filter(transaction::Column::OrderId.eq(order_id))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_by_user(&self, user_id: &str) -> DomainResult<Vec<Transaction>> {
        transaction::Entity::find()
            .filter(transaction::Column::UserId.eq(user_id))
            .order_by_desc(transaction::Column::CreatedAt)
            .order_by_desc(transaction::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    async fn find_ongoing_for_user(&self, user_id: &str) -> DomainResult<Option<Transaction>> {
        transaction::Entity::find()
            .filter(transaction::Column::UserId.eq(user_id))
            .filter(transaction::Column::Status.eq(TransactionStatus::Ongoing.as_str()))
            .order_by_desc(transaction::Column::Id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }
}
