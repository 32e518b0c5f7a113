//! Powerbank entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "powerbanks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub code: String,

    /// Battery capacity in mAh
    pub capacity_mah: i32,

    /// Available, Rented
    pub status: String,

    /// Docking station; NULL while rented
    #[sea_orm(nullable)]
    pub current_station_id: Option<i32>,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::station::Entity",
        from = "Column::CurrentStationId",
        to = "super::station::Column::Id"
    )]
    CurrentStation,
}

impl Related<super::station::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CurrentStation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
