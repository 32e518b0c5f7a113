//! SeaORM implementation of StationRepository

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect,
};

use super::db_err;
use crate::domain::powerbank::PowerbankStatus;
use crate::domain::station::{Station, StationInventory, StationRepository};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::{powerbank, station};

pub struct SeaOrmStationRepository {
    db: DatabaseConnection,
}

impl SeaOrmStationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn model_to_domain(s: station::Model) -> Station {
    Station {
        id: s.id,
        name: s.name,
        latitude: s.latitude,
        longitude: s.longitude,
        capacity: s.capacity,
        powerbank_left: s.powerbank_left,
        address: s.address,
    }
}

#[derive(Debug, FromQueryResult)]
struct AvailableCount {
    station_id: Option<i32>,
    available: i64,
}

#[async_trait]
impl StationRepository for SeaOrmStationRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Station>> {
        let model = station::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_all(&self) -> DomainResult<Vec<Station>> {
        let models = station::Entity::find()
            .order_by_asc(station::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_available(&self) -> DomainResult<Vec<Station>> {
        let models = station::Entity::find()
            .filter(station::Column::PowerbankLeft.gt(0))
            .order_by_asc(station::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_returnable(&self) -> DomainResult<Vec<Station>> {
        let models = station::Entity::find()
            .filter(
                Expr::col(station::Column::PowerbankLeft).lt(Expr::col(station::Column::Capacity)),
            )
            .order_by_asc(station::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn inventory_report(&self) -> DomainResult<Vec<StationInventory>> {
        let stations = station::Entity::find()
            .order_by_asc(station::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let counts: HashMap<i32, i64> = powerbank::Entity::find()
            .select_only()
            .column_as(powerbank::Column::CurrentStationId, "station_id")
            .column_as(Expr::col(powerbank::Column::Id).count(), "available")
            .filter(powerbank::Column::Status.eq(PowerbankStatus::Available.as_str()))
            .group_by(powerbank::Column::CurrentStationId)
            .into_model::<AvailableCount>()
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .filter_map(|row| row.station_id.map(|id| (id, row.available)))
            .collect();

        Ok(stations
            .into_iter()
            .map(|s| StationInventory {
                station_id: s.id,
                capacity: s.capacity,
                powerbank_left: s.powerbank_left,
                available_rows: counts.get(&s.id).copied().unwrap_or(0) as i32,
            })
            .collect())
    }
}
