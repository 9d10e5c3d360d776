//! Application (volunteer request to join an opportunity) entity.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::status_history::{StatusHistoryEntry, decode_history};

/// Lifecycle state of an application.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum ApplicationStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "reviewing")]
    Reviewing,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "withdrawn")]
    Withdrawn,
}

impl ApplicationStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Pending => "PENDING",
            Self::Reviewing => "REVIEWING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Confirmed => "CONFIRMED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Withdrawn => "WITHDRAWN",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(Self::Draft),
            "PENDING" => Ok(Self::Pending),
            "REVIEWING" => Ok(Self::Reviewing),
            "ACCEPTED" => Ok(Self::Accepted),
            "REJECTED" => Ok(Self::Rejected),
            "CONFIRMED" => Ok(Self::Confirmed),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            "WITHDRAWN" => Ok(Self::Withdrawn),
            other => Err(format!("Unknown application status: {other}")),
        }
    }
}

/// Host-side review decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetail {
    pub reviewed_by: String,
    pub reviewed_at: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Who ended the application early, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationDetail {
    pub cancelled_by: String,
    pub cancelled_at: DateTime<Utc>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Completion of the stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionDetail {
    pub completed_by: String,
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Sub-record written alongside a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusDetail {
    Review(ReviewDetail),
    Cancellation(CancellationDetail),
    Completion(CompletionDetail),
}

impl StatusDetail {
    /// Column the detail is stored in.
    #[must_use]
    pub const fn column(&self) -> Column {
        match self {
            Self::Review(_) => Column::Review,
            Self::Cancellation(_) => Column::Cancellation,
            Self::Completion(_) => Column::Completion,
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Json {
        let value = match self {
            Self::Review(d) => serde_json::to_value(d),
            Self::Cancellation(d) => serde_json::to_value(d),
            Self::Completion(d) => serde_json::to_value(d),
        };
        value.unwrap_or(Json::Null)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "application")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub applicant_id: String,

    #[sea_orm(indexed)]
    pub opportunity_id: String,

    pub host_id: String,

    /// Owning host's user (denormalized for authorization)
    #[sea_orm(indexed)]
    pub host_user_id: String,

    pub status: ApplicationStatus,

    pub start_date: Date,

    pub end_date: Date,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub review: Option<Json>,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub cancellation: Option<Json>,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub completion: Option<Json>,

    #[sea_orm(column_type = "JsonBinary")]
    pub status_history: Json,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Decoded status history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<StatusHistoryEntry<ApplicationStatus>> {
        decode_history(&self.status_history)
    }

    #[must_use]
    pub fn review_detail(&self) -> Option<ReviewDetail> {
        self.review
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    #[must_use]
    pub fn cancellation_detail(&self) -> Option<CancellationDetail> {
        self.cancellation
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    #[must_use]
    pub fn completion_detail(&self) -> Option<CompletionDetail> {
        self.completion
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::opportunity::Entity",
        from = "Column::OpportunityId",
        to = "super::opportunity::Column::Id"
    )]
    Opportunity,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ApplicantId",
        to = "super::user::Column::Id"
    )]
    Applicant,
}

impl Related<super::opportunity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Opportunity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
