//! Per-board Slack notification settings

use board_http::{ApiClient, ApiRequest, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::segment;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlackConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Event names that trigger a notification
    #[serde(default)]
    pub notify_on: Vec<String>,
}

fn config_path(board_id: &str) -> String {
    format!("/boards/slack/{}/config", segment(board_id))
}

pub async fn slack_config(client: &ApiClient, board_id: &str) -> Result<SlackConfig> {
    client.send(ApiRequest::get(config_path(board_id))).await?.data()
}

/// Replace the board's settings and return what the server stored.
pub async fn update_slack_config(
    client: &ApiClient,
    board_id: &str,
    config: &SlackConfig,
) -> Result<SlackConfig> {
    let request = ApiRequest::put(config_path(board_id)).json(config)?;
    let stored: SlackConfig = client.send(request).await?.data()?;
    info!(board_id, enabled = stored.enabled, "updated slack config");
    Ok(stored)
}
