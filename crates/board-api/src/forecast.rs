//! Sprint forecast and board health score

use board_http::{ApiClient, ApiRequest, Envelope, QueryString, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintForecast {
    pub average_velocity: f64,
    #[serde(default)]
    pub sprints: Vec<SprintProjection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintProjection {
    pub sprint: u32,
    pub projected_points: f64,
    /// 0.0 to 1.0
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScore {
    pub score: f64,
    pub grade: Option<String>,
}

/// Projection for the next `sprints` sprints.
pub async fn sprint_forecast(
    client: &ApiClient,
    board_id: &str,
    sprints: Option<u32>,
) -> Result<SprintForecast> {
    let query = QueryString::new()
        .push("boardId", board_id)
        .push_opt("sprints", sprints);
    let request = ApiRequest::get("/analytics/sprint-forecast").query(&query);
    client.send(request).await?.data()
}

/// Legacy endpoint: callers get the envelope itself and inspect `success`.
pub async fn health_score(client: &ApiClient, board_id: &str) -> Result<Envelope<HealthScore>> {
    let request = ApiRequest::get("/analytics/health-score")
        .query(&QueryString::new().push("boardId", board_id));
    client.send(request).await?.envelope()
}
