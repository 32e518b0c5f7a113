//! Powerbank station entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "powerbank_stations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    #[sea_orm(column_type = "Double")]
    pub latitude: f64,

    #[sea_orm(column_type = "Double")]
    pub longitude: f64,

    /// Number of slots
    pub capacity: i32,

    /// Available powerbanks; only changed together with a powerbank row
    pub powerbank_left: i32,

    /// Lock controller address (`host[:port]`)
    pub address: String,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::powerbank::Entity")]
    Powerbanks,
}

impl Related<super::powerbank::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Powerbanks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
