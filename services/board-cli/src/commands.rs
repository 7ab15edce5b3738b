//! Command execution
//!
//! Every command produces a JSON value for stdout. Failures stay typed inside
//! `anyhow` so `exit_report` can tell a redirect from an ordinary API error.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use board_api::SlackConfig;
use board_auth::{FileTokenStore, LOGIN_PATH, TokenStore};
use board_http::{ApiClient, ApiError, ClientConfig, Navigator, Redirect};
use serde_json::{Value, json};
use tracing::info;

use crate::cli::{
    Command, ExportArgs, ForecastArgs, GamificationArgs, SlackConfigArgs, UploadArgs,
};
use crate::config::Config;
use crate::error::Error;

/// Exit code for failures that end in the login redirect
pub const EXIT_LOGIN: i32 = 2;

/// Exit code for failures that end in the maintenance redirect
pub const EXIT_MAINTENANCE: i32 = 3;

/// Client plus the store it reads tokens from.
pub struct Session {
    pub client: ApiClient,
    pub store: Arc<FileTokenStore>,
}

impl Session {
    pub async fn open(config: &Config, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let store = FileTokenStore::load(config.storage.token_file.clone())
            .await
            .with_context(|| {
                format!(
                    "failed to load tokens from {}",
                    config.storage.token_file.display()
                )
            })?;
        let store = Arc::new(store);
        let client = ApiClient::new(
            ClientConfig::new(&config.api.base_url).with_timeout(config.timeout()),
            store.clone(),
            navigator,
        )?;
        Ok(Self { client, store })
    }
}

pub async fn run(command: Command, config: &Config, session: &Session) -> Result<Value> {
    let client = &session.client;
    let value = match command {
        Command::Login => return login(config, session).await,
        Command::Logout => {
            session.store.clear().await.context("failed to clear tokens")?;
            info!("logged out");
            json!({ "loggedIn": false })
        }
        Command::LineChart(args) => {
            serde_json::to_value(board_api::line_chart(client, &args.query()).await?)?
        }
        Command::Throughput(args) => {
            serde_json::to_value(board_api::throughput(client, &args.query()).await?)?
        }
        Command::Overdue(args) => {
            serde_json::to_value(board_api::overdue_analysis(client, &args.query()).await?)?
        }
        Command::Collaboration(args) => {
            serde_json::to_value(board_api::collaboration_index(client, &args.query()).await?)?
        }
        Command::Gamification(GamificationArgs {
            board_id,
            leaderboard: true,
            limit,
        }) => serde_json::to_value(board_api::leaderboard(client, &board_id, limit).await?)?,
        Command::Gamification(args) => {
            serde_json::to_value(board_api::adaptive_gamification(client, &args.board_id).await?)?
        }
        Command::Forecast(ForecastArgs {
            board_id,
            health: true,
            ..
        }) => serde_json::to_value(board_api::health_score(client, &board_id).await?)?,
        Command::Forecast(ForecastArgs {
            board_id, sprints, ..
        }) => serde_json::to_value(board_api::sprint_forecast(client, &board_id, sprints).await?)?,
        Command::SlackConfig(SlackConfigArgs {
            board_id,
            set: Some(path),
        }) => {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let slack: SlackConfig = serde_json::from_str(&contents)
                .with_context(|| format!("{} is not a valid slack config", path.display()))?;
            serde_json::to_value(board_api::update_slack_config(client, &board_id, &slack).await?)?
        }
        Command::SlackConfig(SlackConfigArgs { board_id, set: None }) => {
            serde_json::to_value(board_api::slack_config(client, &board_id).await?)?
        }
        Command::Export(ExportArgs {
            board_id,
            format,
            out,
        }) => {
            let download = board_api::export_report(client, &board_id, format.into()).await?;
            let path = download.save_into(&out).await?;
            json!({ "path": path.display().to_string(), "bytes": download.data.len() })
        }
        Command::Upload(UploadArgs {
            board_id,
            file,
            mime,
        }) => {
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let file_name = file_name(&file);
            let attachment =
                board_api::upload_attachment(client, &board_id, &file_name, mime.as_deref(), data)
                    .await?;
            serde_json::to_value(attachment)?
        }
    };
    Ok(value)
}

async fn login(config: &Config, session: &Session) -> Result<Value> {
    let email = config.auth.email.as_deref().ok_or(Error::MissingEmail)?;
    let password = config.auth.password.as_ref().ok_or(Error::MissingPassword)?;

    // Login is unauthenticated and must not pass through the refresh pipeline
    let http = reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .context("failed to build HTTP client")?;
    let pair = board_auth::login(&http, &session.client.url(LOGIN_PATH), email, password.expose())
        .await
        .context("login failed")?;
    session
        .store
        .set_tokens(pair)
        .await
        .context("failed to store tokens")?;

    info!(email, "logged in");
    Ok(json!({ "loggedIn": true, "email": email }))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}

/// Message and exit code for a failed command.
pub fn exit_report(err: &anyhow::Error) -> (String, i32) {
    let Some(api) = err.downcast_ref::<ApiError>() else {
        return (format!("error: {err:#}"), 1);
    };
    match api.redirect() {
        Some(Redirect::Login) => (
            "Your session has expired. Run `board login` to sign in again.".to_string(),
            EXIT_LOGIN,
        ),
        Some(Redirect::Maintenance) => (
            "The board service is unavailable or under maintenance. Please try again later."
                .to_string(),
            EXIT_MAINTENANCE,
        ),
        None => (api.user_message("The request failed."), 1),
    }
}
