//! Collaboration index

use board_http::{ApiClient, ApiRequest, Result};
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsQuery;

/// Board-wide collaboration score with per-member breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationIndex {
    pub score: f64,
    #[serde(default)]
    pub members: Vec<MemberCollaboration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberCollaboration {
    pub user_id: String,
    pub name: String,
    pub score: f64,
    pub interactions: u32,
}

pub async fn collaboration_index(
    client: &ApiClient,
    query: &AnalyticsQuery,
) -> Result<CollaborationIndex> {
    let request = ApiRequest::get("/analytics/collaboration-index").query(&query.query_string());
    client.send(request).await?.data()
}
