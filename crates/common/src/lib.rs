//! Types shared by the board client crates and the `board` binary

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
