//! SeaORM implementation of the RentalLedger
//!
//! Every public operation is one database transaction. The first statement
//! of each racing operation is a conditional update on the transaction row
//! (or the station row) so that the loser of a race blocks on the write lock
//! and then observes the winner's committed state.

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::{info, warn};

use super::inventory::{release_at, reserve_at};
use super::transaction_repository::model_to_domain;
use super::{db_err, is_unique_violation};
use crate::domain::rental::{
    NewPendingRental, RentalLedger, Settlement, Transaction, TransactionStatus,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{station, transaction};

pub struct SeaOrmRentalLedger {
    db: DatabaseConnection,
}

impl SeaOrmRentalLedger {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn begin(&self) -> DomainResult<DatabaseTransaction> {
        self.db.begin().await.map_err(db_err)
    }
}

/// Commit on success, roll back on error. The error of the unit wins over a
/// failing rollback.
async fn finish<T>(txn: DatabaseTransaction, result: DomainResult<T>) -> DomainResult<T> {
    match result {
        Ok(value) => {
            txn.commit().await.map_err(db_err)?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rb) = txn.rollback().await {
                warn!(error = %rb, "Rollback failed");
            }
            Err(e)
        }
    }
}

async fn load<C: ConnectionTrait>(conn: &C, id: i32) -> DomainResult<Transaction> {
    let model = transaction::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("Transaction", "id", id))?;
    model_to_domain(model)
}

async fn load_by_order<C: ConnectionTrait>(
    conn: &C,
    order_id: &str,
) -> DomainResult<Option<transaction::Model>> {
    transaction::Entity::find()
        .filter(transaction::Column::OrderId.eq(order_id))
        .one(conn)
        .await
        .map_err(db_err)
}

/// Touch the row of `order_id` if it is still `Pending`. Returns the row id
/// when this caller owns the transition.
async fn claim_pending<C: ConnectionTrait>(conn: &C, order_id: &str) -> DomainResult<Option<i32>> {
    let claimed = transaction::Entity::update_many()
        .col_expr(transaction::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(transaction::Column::OrderId.eq(order_id))
        .filter(transaction::Column::Status.eq(TransactionStatus::Pending.as_str()))
        .exec(conn)
        .await
        .map_err(db_err)?;

    if claimed.rows_affected == 0 {
        return Ok(None);
    }
    let model = load_by_order(conn, order_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Transaction", "order_id", order_id))?;
    Ok(Some(model.id))
}

/// Settlement answer for a row that was not `Pending` anymore.
async fn unchanged<C: ConnectionTrait>(conn: &C, order_id: &str) -> DomainResult<Settlement> {
    let model = load_by_order(conn, order_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Transaction", "order_id", order_id))?;
    debug!("Order {} already settled as {}", order_id, model.status);
    Ok(Settlement::unchanged(model_to_domain(model)?))
}

/// Move transaction `id` from `from` to `status`. Edges outside the
/// lifecycle graph are refused before anything is written.
async fn set_status<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    from: TransactionStatus,
    status: TransactionStatus,
    powerbank_id: Option<i32>,
) -> DomainResult<()> {
    if !from.can_transition_to(status) {
        return Err(DomainError::InvalidTransition {
            transaction_id: id,
            status: from,
            operation: status.as_str(),
        });
    }
    let mut update = transaction::Entity::update_many()
        .col_expr(transaction::Column::Status, Expr::value(status.as_str()))
        .col_expr(transaction::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(transaction::Column::Id.eq(id));
    if let Some(powerbank_id) = powerbank_id {
        update = update.col_expr(transaction::Column::PowerbankId, Expr::value(powerbank_id));
    }
    update.exec(conn).await.map_err(db_err)?;
    Ok(())
}

async fn settle_success_in(txn: &DatabaseTransaction, order_id: &str) -> DomainResult<Settlement> {
    let Some(id) = claim_pending(txn, order_id).await? else {
        return unchanged(txn, order_id).await;
    };
    let pending = load(txn, id).await?;

    match reserve_at(txn, pending.origin_station_id).await {
        Ok(powerbank_id) => {
            set_status(
                txn,
                id,
                pending.status,
                TransactionStatus::Ongoing,
                Some(powerbank_id),
            )
            .await?;
            info!(
                transaction_id = id,
                order_id,
                powerbank_id,
                station_id = pending.origin_station_id,
                "Payment settled, rental started"
            );
        }
        Err(DomainError::NoInventory { station_id }) => {
            set_status(txn, id, pending.status, TransactionStatus::Failed, None).await?;
            warn!(
                transaction_id = id,
                order_id, station_id, "Payment settled but station ran out of powerbanks"
            );
        }
        Err(e) => return Err(e),
    }

    Ok(Settlement::applied(load(txn, id).await?))
}

async fn settle_failure_in(txn: &DatabaseTransaction, order_id: &str) -> DomainResult<Settlement> {
    let Some(id) = claim_pending(txn, order_id).await? else {
        return unchanged(txn, order_id).await;
    };
    set_status(
        txn,
        id,
        TransactionStatus::Pending,
        TransactionStatus::Failed,
        None,
    )
    .await?;
    info!(transaction_id = id, order_id, "Payment failed, rental cancelled");
    Ok(Settlement::applied(load(txn, id).await?))
}

async fn return_at_in(
    txn: &DatabaseTransaction,
    transaction_id: i32,
    station_id: i32,
) -> DomainResult<Transaction> {
    let now = Utc::now();
    let claimed = transaction::Entity::update_many()
        .col_expr(transaction::Column::UpdatedAt, Expr::value(now))
        .filter(transaction::Column::Id.eq(transaction_id))
        .filter(transaction::Column::Status.eq(TransactionStatus::Ongoing.as_str()))
        .exec(txn)
        .await
        .map_err(db_err)?;

    if claimed.rows_affected == 0 {
        let current = load(txn, transaction_id).await?;
        return Err(DomainError::InvalidTransition {
            transaction_id,
            status: current.status,
            operation: "return",
        });
    }

    let ongoing = load(txn, transaction_id).await?;
    let Some(powerbank_id) = ongoing.powerbank_id else {
        return Err(DomainError::DataInconsistency(format!(
            "ongoing transaction {} has no powerbank",
            transaction_id
        )));
    };

    release_at(txn, station_id, powerbank_id).await?;

    transaction::Entity::update_many()
        .col_expr(
            transaction::Column::Status,
            Expr::value(TransactionStatus::Returned.as_str()),
        )
        .col_expr(transaction::Column::ReturnStationId, Expr::value(station_id))
        .col_expr(transaction::Column::DateReturned, Expr::value(now))
        .filter(transaction::Column::Id.eq(transaction_id))
        .exec(txn)
        .await
        .map_err(db_err)?;

    info!(transaction_id, powerbank_id, station_id, "Powerbank returned");
    load(txn, transaction_id).await
}

async fn create_ongoing_in(
    txn: &DatabaseTransaction,
    user_id: &str,
    station_id: i32,
) -> DomainResult<Transaction> {
    let powerbank_id = reserve_at(txn, station_id).await?;
    let now = Utc::now();

    let model = transaction::ActiveModel {
        user_id: Set(user_id.to_string()),
        powerbank_id: Set(Some(powerbank_id)),
        origin_station_id: Set(station_id),
        return_station_id: Set(None),
        status: Set(TransactionStatus::Ongoing.as_str().to_string()),
        order_id: Set(None),
        payment_token: Set(None),
        payment_redirect_url: Set(None),
        amount: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        date_returned: Set(None),
        ..Default::default()
    };
    let inserted = model.insert(txn).await.map_err(db_err)?;

    info!(
        transaction_id = inserted.id,
        user_id, powerbank_id, station_id, "Rental started"
    );
    model_to_domain(inserted)
}

#[async_trait]
impl RentalLedger for SeaOrmRentalLedger {
    async fn create_ongoing(&self, user_id: &str, station_id: i32) -> DomainResult<Transaction> {
        debug!("Creating ongoing rental for {} at station {}", user_id, station_id);
        let txn = self.begin().await?;
        let result = create_ongoing_in(&txn, user_id, station_id).await;
        finish(txn, result).await
    }

    async fn create_pending(&self, rental: NewPendingRental) -> DomainResult<Transaction> {
        debug!("Creating pending rental for order {}", rental.order_id);
        station::Entity::find_by_id(rental.origin_station_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Station", "id", rental.origin_station_id))?;

        let now = Utc::now();
        let order_id = rental.order_id.clone();
        let model = transaction::ActiveModel {
            user_id: Set(rental.user_id),
            powerbank_id: Set(None),
            origin_station_id: Set(rental.origin_station_id),
            return_station_id: Set(None),
            status: Set(TransactionStatus::Pending.as_str().to_string()),
            order_id: Set(Some(rental.order_id)),
            payment_token: Set(rental.payment_token),
            payment_redirect_url: Set(rental.payment_redirect_url),
            amount: Set(rental.amount),
            created_at: Set(now),
            updated_at: Set(now),
            date_returned: Set(None),
            ..Default::default()
        };

        let inserted = model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::Conflict(format!("Order {} already exists", order_id))
            } else {
                db_err(e)
            }
        })?;
        model_to_domain(inserted)
    }

    async fn settle_success(&self, order_id: &str) -> DomainResult<Settlement> {
        let txn = self.begin().await?;
        let result = settle_success_in(&txn, order_id).await;
        finish(txn, result).await
    }

    async fn settle_failure(&self, order_id: &str) -> DomainResult<Settlement> {
        let txn = self.begin().await?;
        let result = settle_failure_in(&txn, order_id).await;
        finish(txn, result).await
    }

    async fn return_at(&self, transaction_id: i32, station_id: i32) -> DomainResult<Transaction> {
        let txn = self.begin().await?;
        let result = return_at_in(&txn, transaction_id, station_id).await;
        finish(txn, result).await
    }
}
