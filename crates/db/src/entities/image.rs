//! Image metadata entity for files stored on the media CDN.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Where an image is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum ImagePurpose {
    #[sea_orm(string_value = "avatar")]
    Avatar,
    #[sea_orm(string_value = "host")]
    Host,
    #[sea_orm(string_value = "opportunity")]
    Opportunity,
    #[sea_orm(string_value = "other")]
    #[default]
    Other,
}

impl ImagePurpose {
    /// Sub-folder on the CDN.
    #[must_use]
    pub const fn folder(&self) -> &'static str {
        match self {
            Self::Avatar => "avatars",
            Self::Host => "hosts",
            Self::Opportunity => "opportunities",
            Self::Other => "misc",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "image")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub owner_id: String,

    /// CDN public id
    #[sea_orm(unique)]
    pub public_id: String,

    pub url: String,

    pub width: i32,

    pub height: i32,

    pub format: String,

    pub bytes: i64,

    pub purpose: ImagePurpose,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
