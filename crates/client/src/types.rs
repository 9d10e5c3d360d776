//! Wire types returned by the API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use taiwanstay_db::entities::{
    StatusHistoryEntry,
    application::{ApplicationStatus, CancellationDetail, CompletionDetail, ReviewDetail},
    opportunity::OpportunityStatus,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub host_id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub city: String,
    pub work_hours_per_week: Option<i32>,
    pub min_stay_days: Option<i32>,
    pub max_stay_days: Option<i32>,
    pub positions: i32,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub status: OpportunityStatus,
    pub status_label: String,
    #[serde(default)]
    pub status_history: Vec<StatusHistoryEntry<OpportunityStatus>>,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub applicant_id: String,
    pub opportunity_id: String,
    pub host_id: String,
    pub host_user_id: String,
    pub status: ApplicationStatus,
    pub status_label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub message: String,
    pub review: Option<ReviewDetail>,
    pub cancellation: Option<CancellationDetail>,
    pub completion: Option<CompletionDetail>,
    #[serde(default)]
    pub status_history: Vec<StatusHistoryEntry<ApplicationStatus>>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// Filters for [`crate::TaiwanStayClient::list_opportunities`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl OpportunityQuery {
    pub(crate) fn cache_key(&self) -> String {
        format!(
            "city={}&hostId={}&limit={}&offset={}",
            self.city.as_deref().unwrap_or_default(),
            self.host_id.as_deref().unwrap_or_default(),
            self.limit.map(|l| l.to_string()).unwrap_or_default(),
            self.offset.map(|o| o.to_string()).unwrap_or_default(),
        )
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpportunityEnvelope {
    pub opportunity: Opportunity,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplicationEnvelope {
    pub application: Application,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}
