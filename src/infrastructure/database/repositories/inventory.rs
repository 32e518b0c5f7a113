//! Inventory store: moves a powerbank in or out of a station together with
//! the station counter.
//!
//! Both operations run on the caller's connection, normally an open
//! `DatabaseTransaction`, and start with a conditional counter update so
//! concurrent callers serialize on the station row.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::error;

use super::db_err;
use crate::domain::powerbank::PowerbankStatus;
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{powerbank, station};

/// Take one available powerbank out of `station_id`.
///
/// Returns the id of the reserved unit, now `Rented` and undocked.
pub(crate) async fn reserve_at<C: ConnectionTrait>(conn: &C, station_id: i32) -> DomainResult<i32> {
    let claimed = station::Entity::update_many()
        .col_expr(
            station::Column::PowerbankLeft,
            Expr::col(station::Column::PowerbankLeft).sub(1),
        )
        .filter(station::Column::Id.eq(station_id))
        .filter(station::Column::PowerbankLeft.gt(0))
        .exec(conn)
        .await
        .map_err(db_err)?;

    if claimed.rows_affected == 0 {
        return Err(match find_station(conn, station_id).await? {
            None => DomainError::not_found("Station", "id", station_id),
            Some(_) => DomainError::NoInventory { station_id },
        });
    }

    let unit = powerbank::Entity::find()
        .filter(powerbank::Column::CurrentStationId.eq(station_id))
        .filter(powerbank::Column::Status.eq(PowerbankStatus::Available.as_str()))
        .order_by_asc(powerbank::Column::Id)
        .one(conn)
        .await
        .map_err(db_err)?;

    let Some(unit) = unit else {
        error!(
            station_id,
            "Station counter reports stock but no available powerbank is docked"
        );
        return Err(DomainError::DataInconsistency(format!(
            "station {} counter is positive but no available powerbank row exists",
            station_id
        )));
    };

    let taken = powerbank::Entity::update_many()
        .col_expr(
            powerbank::Column::Status,
            Expr::value(PowerbankStatus::Rented.as_str()),
        )
        .col_expr(powerbank::Column::CurrentStationId, Expr::value(Option::<i32>::None))
        .col_expr(powerbank::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(powerbank::Column::Id.eq(unit.id))
        .filter(powerbank::Column::Status.eq(PowerbankStatus::Available.as_str()))
        .exec(conn)
        .await
        .map_err(db_err)?;

    if taken.rows_affected != 1 {
        error!(station_id, powerbank_id = unit.id, "Powerbank changed under reservation");
        return Err(DomainError::DataInconsistency(format!(
            "powerbank {} was no longer available at station {}",
            unit.id, station_id
        )));
    }

    Ok(unit.id)
}

/// Dock the rented powerbank `powerbank_id` at `station_id`.
pub(crate) async fn release_at<C: ConnectionTrait>(
    conn: &C,
    station_id: i32,
    powerbank_id: i32,
) -> DomainResult<()> {
    let claimed = station::Entity::update_many()
        .col_expr(
            station::Column::PowerbankLeft,
            Expr::col(station::Column::PowerbankLeft).add(1),
        )
        .filter(station::Column::Id.eq(station_id))
        .filter(Expr::col(station::Column::PowerbankLeft).lt(Expr::col(station::Column::Capacity)))
        .exec(conn)
        .await
        .map_err(db_err)?;

    if claimed.rows_affected == 0 {
        return Err(match find_station(conn, station_id).await? {
            None => DomainError::not_found("Station", "id", station_id),
            Some(_) => DomainError::StationFull { station_id },
        });
    }

    let docked = powerbank::Entity::update_many()
        .col_expr(
            powerbank::Column::Status,
            Expr::value(PowerbankStatus::Available.as_str()),
        )
        .col_expr(powerbank::Column::CurrentStationId, Expr::value(Some(station_id)))
        .col_expr(powerbank::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(powerbank::Column::Id.eq(powerbank_id))
        .filter(powerbank::Column::Status.eq(PowerbankStatus::Rented.as_str()))
        .exec(conn)
        .await
        .map_err(db_err)?;

    if docked.rows_affected != 1 {
        error!(station_id, powerbank_id, "Returned powerbank is not rented");
        return Err(DomainError::DataInconsistency(format!(
            "powerbank {} is not rented, cannot dock it at station {}",
            powerbank_id, station_id
        )));
    }

    Ok(())
}

async fn find_station<C: ConnectionTrait>(
    conn: &C,
    station_id: i32,
) -> DomainResult<Option<station::Model>> {
    station::Entity::find_by_id(station_id)
        .one(conn)
        .await
        .map_err(db_err)
}
