//! Opportunity (work-exchange listing) entity.

use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::status_history::{StatusHistoryEntry, decode_history};

/// Lifecycle state of an opportunity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum OpportunityStatus {
    #[sea_orm(string_value = "draft")]
    #[default]
    Draft,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "paused")]
    Paused,
    #[sea_orm(string_value = "admin_paused")]
    AdminPaused,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "filled")]
    Filled,
    #[sea_orm(string_value = "archived")]
    Archived,
    #[sea_orm(string_value = "deleted")]
    Deleted,
}

impl OpportunityStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Paused => "PAUSED",
            Self::AdminPaused => "ADMIN_PAUSED",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
            Self::Filled => "FILLED",
            Self::Archived => "ARCHIVED",
            Self::Deleted => "DELETED",
        }
    }

    /// Listings anyone may see.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::Active | Self::Filled)
    }
}

impl fmt::Display for OpportunityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpportunityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(Self::Draft),
            "PENDING" => Ok(Self::Pending),
            "ACTIVE" => Ok(Self::Active),
            "PAUSED" => Ok(Self::Paused),
            "ADMIN_PAUSED" => Ok(Self::AdminPaused),
            "REJECTED" => Ok(Self::Rejected),
            "EXPIRED" => Ok(Self::Expired),
            "FILLED" => Ok(Self::Filled),
            "ARCHIVED" => Ok(Self::Archived),
            "DELETED" => Ok(Self::Deleted),
            other => Err(format!("Unknown opportunity status: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "opportunity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub host_id: String,

    /// Owning host's user (denormalized for ownership checks)
    #[sea_orm(indexed)]
    pub user_id: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[sea_orm(indexed)]
    pub city: String,

    #[sea_orm(nullable)]
    pub work_hours_per_week: Option<i32>,

    #[sea_orm(nullable)]
    pub min_stay_days: Option<i32>,

    #[sea_orm(nullable)]
    pub max_stay_days: Option<i32>,

    #[sea_orm(default_value = 1)]
    pub positions: i32,

    /// What volunteers receive in exchange (array of strings)
    #[sea_orm(column_type = "JsonBinary")]
    pub benefits: Json,

    #[sea_orm(indexed)]
    pub status: OpportunityStatus,

    /// Append-only array of status history entries
    #[sea_orm(column_type = "JsonBinary")]
    pub status_history: Json,

    /// First time the listing went ACTIVE
    #[sea_orm(nullable)]
    pub published_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Decoded status history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<StatusHistoryEntry<OpportunityStatus>> {
        decode_history(&self.status_history)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::host::Entity",
        from = "Column::HostId",
        to = "super::host::Column::Id"
    )]
    Host,
    #[sea_orm(has_many = "super::application::Entity")]
    Applications,
}

impl Related<super::host::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Host.def()
    }
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
