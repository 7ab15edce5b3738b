//! Board analytics: line chart, throughput, overdue analysis

use board_http::{ApiClient, ApiRequest, QueryString, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Board and optional date window shared by the analytics endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsQuery {
    pub board_id: String,
    /// Inclusive start date, `YYYY-MM-DD`
    pub from: Option<String>,
    /// Inclusive end date, `YYYY-MM-DD`
    pub to: Option<String>,
}

impl AnalyticsQuery {
    pub fn new(board_id: impl Into<String>) -> Self {
        Self {
            board_id: board_id.into(),
            from: None,
            to: None,
        }
    }

    pub fn from(mut self, date: impl Into<String>) -> Self {
        self.from = Some(date.into());
        self
    }

    pub fn to(mut self, date: impl Into<String>) -> Self {
        self.to = Some(date.into());
        self
    }

    pub(crate) fn query_string(&self) -> QueryString {
        QueryString::new()
            .push("boardId", &self.board_id)
            .push_opt("from", self.from.as_deref())
            .push_opt("to", self.to.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChart {
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// Tasks started and completed in one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThroughputPoint {
    pub period: String,
    pub started: u32,
    pub completed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueAnalysis {
    pub total_overdue: u32,
    pub average_days_overdue: f64,
    #[serde(default)]
    pub tasks: Vec<OverdueTask>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueTask {
    pub id: String,
    pub title: String,
    pub assignee: Option<String>,
    pub days_overdue: u32,
}

pub async fn line_chart(client: &ApiClient, query: &AnalyticsQuery) -> Result<LineChart> {
    let request = ApiRequest::get("/analytics/line-chart").query(&query.query_string());
    client.send(request).await?.data()
}

pub async fn throughput(
    client: &ApiClient,
    query: &AnalyticsQuery,
) -> Result<Vec<ThroughputPoint>> {
    let request = ApiRequest::get("/analytics/throughput").query(&query.query_string());
    let points: Vec<ThroughputPoint> = client.send(request).await?.data()?;
    debug!(board_id = %query.board_id, periods = points.len(), "fetched throughput");
    Ok(points)
}

pub async fn overdue_analysis(
    client: &ApiClient,
    query: &AnalyticsQuery,
) -> Result<OverdueAnalysis> {
    let request = ApiRequest::get("/analytics/overdue").query(&query.query_string());
    client.send(request).await?.data()
}
