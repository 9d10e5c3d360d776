//! Per-provider daily email counter.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "email_usage")]
pub struct Model {
    /// `{provider}:{YYYY-MM-DD}`
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub provider: String,

    /// UTC day being counted
    pub day: Date,

    pub count: i32,

    pub updated_at: DateTimeWithTimeZone,
}

/// Row key for a provider and day.
#[must_use]
pub fn usage_key(provider: &str, day: Date) -> String {
    format!("{provider}:{}", day.format("%Y-%m-%d"))
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
