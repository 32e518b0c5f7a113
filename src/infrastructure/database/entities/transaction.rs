//! Rental transaction entity (the ledger)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: String,

    /// NULL until a unit is reserved (payment flow)
    #[sea_orm(nullable)]
    pub powerbank_id: Option<i32>,

    pub origin_station_id: i32,

    #[sea_orm(nullable)]
    pub return_station_id: Option<i32>,

    /// Pending, Ongoing, Returned, Failed
    pub status: String,

    /// Payment gateway order reference
    #[sea_orm(nullable, unique)]
    pub order_id: Option<String>,

    #[sea_orm(nullable)]
    pub payment_token: Option<String>,

    #[sea_orm(nullable)]
    pub payment_redirect_url: Option<String>,

    /// Charged amount in the smallest currency unit
    #[sea_orm(nullable)]
    pub amount: Option<i64>,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub date_returned: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::powerbank::Entity",
        from = "Column::PowerbankId",
        to = "super::powerbank::Column::Id"
    )]
    Powerbank,

    #[sea_orm(
        belongs_to = "super::station::Entity",
        from = "Column::OriginStationId",
        to = "super::station::Column::Id"
    )]
    OriginStation,

    #[sea_orm(
        belongs_to = "super::station::Entity",
        from = "Column::ReturnStationId",
        to = "super::station::Column::Id"
    )]
    ReturnStation,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::powerbank::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Powerbank.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
