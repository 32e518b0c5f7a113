//! SeaORM implementation of PowerbankRepository

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use super::db_err;
use crate::domain::powerbank::{Powerbank, PowerbankRepository, PowerbankStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::powerbank;

pub struct SeaOrmPowerbankRepository {
    db: DatabaseConnection,
}

impl SeaOrmPowerbankRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(p: powerbank::Model) -> DomainResult<Powerbank> {
    let status = PowerbankStatus::from_str(&p.status).ok_or_else(|| {
        DomainError::DataInconsistency(format!(
            "powerbank {} has unknown status '{}'",
            p.id, p.status
        ))
    })?;
    Ok(Powerbank {
        id: p.id,
        code: p.code,
        capacity_mah: p.capacity_mah,
        status,
        current_station_id: p.current_station_id,
    })
}

#[async_trait]
impl PowerbankRepository for SeaOrmPowerbankRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Powerbank>> {
        powerbank::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_at_station(&self, station_id: i32) -> DomainResult<Vec<Powerbank>> {
        powerbank::Entity::find()
            .filter(powerbank::Column::CurrentStationId.eq(station_id))
            .order_by_asc(powerbank::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }
}
