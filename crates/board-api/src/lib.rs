//! Typed wrappers for the board API
//!
//! One async function per backend endpoint. Each builds the request, sends it
//! through `board_http::ApiClient`, and unwraps the `{success, data, message}`
//! envelope into the declared response type. Wrappers never retry and never
//! translate errors: token refresh, redirects, and pass-through failures are
//! all handled by the client.

pub mod analytics;
pub mod collaboration;
pub mod export;
pub mod forecast;
pub mod gamification;
pub mod slack;

#[cfg(test)]
mod testing;

pub use analytics::{
    AnalyticsQuery, LineChart, OverdueAnalysis, OverdueTask, Series, ThroughputPoint,
    line_chart, overdue_analysis, throughput,
};
pub use board_http::{ApiClient, ApiError, Download, Envelope, Result};
pub use collaboration::{CollaborationIndex, MemberCollaboration, collaboration_index};
pub use export::{Attachment, ExportFormat, export_report, upload_attachment};
pub use forecast::{HealthScore, SprintForecast, SprintProjection, health_score, sprint_forecast};
pub use gamification::{
    Badge, GamificationProfile, LeaderboardEntry, adaptive_gamification, leaderboard,
};
pub use slack::{SlackConfig, slack_config, update_slack_config};

/// Percent-encode one path segment such as a board id.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
