//! Host organization entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of host organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostType {
    #[sea_orm(string_value = "farm")]
    Farm,
    #[sea_orm(string_value = "hostel")]
    Hostel,
    #[sea_orm(string_value = "ngo")]
    Ngo,
    #[sea_orm(string_value = "homestay")]
    Homestay,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "host")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning user
    #[sea_orm(indexed)]
    pub user_id: String,

    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub host_type: HostType,

    #[sea_orm(indexed)]
    pub city: String,

    #[sea_orm(nullable)]
    pub address: Option<String>,

    #[sea_orm(nullable)]
    pub contact_email: Option<String>,

    #[sea_orm(nullable)]
    pub website: Option<String>,

    /// Set by admins after checking the organization
    #[sea_orm(default_value = false)]
    pub is_verified: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::opportunity::Entity")]
    Opportunities,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::opportunity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Opportunities.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
