//! Station repository interface

use async_trait::async_trait;

use super::model::{Station, StationInventory};
use crate::domain::DomainResult;

#[async_trait]
pub trait StationRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Station>>;
    async fn find_all(&self) -> DomainResult<Vec<Station>>;
    /// Stations with at least one powerbank to rent
    async fn find_available(&self) -> DomainResult<Vec<Station>>;
    /// Stations with at least one free slot
    async fn find_returnable(&self) -> DomainResult<Vec<Station>>;
    async fn inventory_report(&self) -> DomainResult<Vec<StationInventory>>;
}
