use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sale")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Table or customer label shown on tickets and the sales list.
    pub client_name: String,

    pub sale_date: DateTime<Utc>,

    /// Pre-charge sum of the line items.
    pub total_amount: Decimal,

    pub area_id: Option<i64>,
    pub order_type: String,
    pub phone_no: Option<String>,
    pub delivery_address: Option<String>,

    /// Creator; ownership gate for non-admin updates.
    pub user_id: Option<i64>,

    /// Service-charge percentage snapshotted at order time (Dine In only).
    pub dispatch_amount: Decimal,

    /// Fixed delivery fee snapshotted at order time (Home Delivery only).
    pub delivery_charges: Decimal,

    pub closed: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sale_item::Entity")]
    SaleItem,
    #[sea_orm(
        belongs_to = "super::area::Entity",
        from = "Column::AreaId",
        to = "super::area::Column::Id"
    )]
    Area,
    #[sea_orm(
        belongs_to = "super::user_login::Entity",
        from = "Column::UserId",
        to = "super::user_login::Column::Id"
    )]
    UserLogin,
}

impl Related<super::sale_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleItem.def()
    }
}

impl Related<super::area::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Area.def()
    }
}

impl Related<super::user_login::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserLogin.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {}
