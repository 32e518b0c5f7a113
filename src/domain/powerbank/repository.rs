//! Powerbank repository interface (read side; writes go through the ledger)

use async_trait::async_trait;

use super::model::Powerbank;
use crate::domain::DomainResult;

#[async_trait]
pub trait PowerbankRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Powerbank>>;
    async fn find_at_station(&self, station_id: i32) -> DomainResult<Vec<Powerbank>>;
}
