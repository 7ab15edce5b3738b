//! Command-line errors
//!
//! Argument errors are reported by clap and API failures travel as
//! `board_http::ApiError` inside `anyhow`; these cover missing login
//! credentials.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("login needs auth.email in the config file")]
    MissingEmail,

    #[error("login needs BOARD_PASSWORD or auth.password_file")]
    MissingPassword,
}
