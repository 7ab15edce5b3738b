//! Argument parsing

use std::path::PathBuf;

use board_api::{AnalyticsQuery, ExportFormat};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "board", about = "Command-line client for the board analytics API")]
pub struct Cli {
    /// Config file (falls back to CONFIG_PATH, then board.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Sign in and store tokens
    Login,
    /// Forget stored tokens
    Logout,
    LineChart(AnalyticsArgs),
    Throughput(AnalyticsArgs),
    Overdue(AnalyticsArgs),
    Collaboration(AnalyticsArgs),
    Gamification(GamificationArgs),
    Forecast(ForecastArgs),
    SlackConfig(SlackConfigArgs),
    Export(ExportArgs),
    Upload(UploadArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct AnalyticsArgs {
    #[arg(long = "board")]
    pub board_id: String,
    /// Start date, YYYY-MM-DD
    #[arg(long)]
    pub from: Option<String>,
    /// End date, YYYY-MM-DD
    #[arg(long)]
    pub to: Option<String>,
}

impl AnalyticsArgs {
    pub fn query(&self) -> AnalyticsQuery {
        AnalyticsQuery {
            board_id: self.board_id.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct GamificationArgs {
    #[arg(long = "board")]
    pub board_id: String,
    /// Show the leaderboard instead of the caller's profile
    #[arg(long)]
    pub leaderboard: bool,
    #[arg(long, requires = "leaderboard")]
    pub limit: Option<u32>,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ForecastArgs {
    #[arg(long = "board")]
    pub board_id: String,
    #[arg(long, conflicts_with = "health")]
    pub sprints: Option<u32>,
    /// Fetch the board health score envelope
    #[arg(long)]
    pub health: bool,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct SlackConfigArgs {
    #[arg(long = "board")]
    pub board_id: String,
    /// JSON file with the settings to store
    #[arg(long)]
    pub set: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ExportArgs {
    #[arg(long = "board")]
    pub board_id: String,
    #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
    pub format: FormatArg,
    /// Directory the report is saved into
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct UploadArgs {
    #[arg(long = "board")]
    pub board_id: String,
    #[arg(long)]
    pub file: PathBuf,
    #[arg(long)]
    pub mime: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}
