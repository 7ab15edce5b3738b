//! Adaptive gamification and leaderboard

use board_http::{ApiClient, ApiRequest, QueryString, Result};
use serde::{Deserialize, Serialize};

/// Current user's standing on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamificationProfile {
    pub level: u32,
    pub points: u64,
    #[serde(default)]
    pub badges: Vec<Badge>,
    /// Set when the server's activity checks flagged the account
    #[serde(default)]
    pub flagged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub earned_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: String,
    pub name: String,
    pub points: u64,
}

pub async fn adaptive_gamification(
    client: &ApiClient,
    board_id: &str,
) -> Result<GamificationProfile> {
    let query = QueryString::new().push("boardId", board_id);
    let request = ApiRequest::get("/adaptive-gamification").query(&query);
    client.send(request).await?.data()
}

/// Top entries for a board, `limit` left to the server when `None`.
pub async fn leaderboard(
    client: &ApiClient,
    board_id: &str,
    limit: Option<u32>,
) -> Result<Vec<LeaderboardEntry>> {
    let query = QueryString::new()
        .push("boardId", board_id)
        .push_opt("limit", limit);
    let request = ApiRequest::get("/adaptive-gamification/leaderboard").query(&query);
    client.send(request).await?.data()
}
