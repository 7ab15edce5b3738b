//! File downloads
//!
//! Export endpoints answer with a binary body and a `Content-Disposition`
//! header naming the file. Both the plain `filename="..."` form and the
//! RFC 5987 `filename*=UTF-8''...` form are understood; the extended form
//! wins when a server sends both.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::response::ApiResponse;

/// Name used when neither the server nor the caller supplies one
pub const DEFAULT_FILENAME: &str = "download";

/// Downloaded file held in memory.
#[derive(Debug, Clone)]
pub struct Download {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl Download {
    /// Build from a response, naming it from `Content-Disposition` or `fallback`.
    pub fn from_response(response: ApiResponse, fallback: Option<&str>) -> Self {
        let headers = response.headers();
        let disposition = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok());
        let filename = filename_from_content_disposition(disposition, fallback);
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Self {
            filename,
            content_type,
            data: response.into_body(),
        }
    }

    /// Write into `dir` under a sanitized filename and return the path.
    pub async fn save_into(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(sanitize(&self.filename));
        tokio::fs::write(&path, &self.data)
            .await
            .map_err(|e| ApiError::Io(format!("writing {}: {e}", path.display())))?;
        debug!(path = %path.display(), bytes = self.data.len(), "saved download");
        Ok(path)
    }
}

/// Derive a filename from a `Content-Disposition` header value.
pub fn filename_from_content_disposition(header: Option<&str>, fallback: Option<&str>) -> String {
    header
        .and_then(|h| extended_filename(h).or_else(|| plain_filename(h)))
        .filter(|name| !name.is_empty())
        .or_else(|| fallback.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

/// Value of the `name=` parameter with quoting removed.
fn parameter(header: &str, name: &str) -> Option<String> {
    let mut rest = header;
    loop {
        let (param, tail) = next_param(rest);
        if let Some((key, value)) = param.split_once('=') {
            if key.trim().eq_ignore_ascii_case(name) {
                return Some(unquote(value.trim()));
            }
        }
        rest = tail?;
    }
}

/// Split off the first `;`-separated parameter. Separators inside a quoted
/// string do not count.
fn next_param(input: &str) -> (&str, Option<&str>) {
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => return (&input[..i], Some(&input[i + 1..])),
            _ => {}
        }
    }
    (input, None)
}

fn unquote(value: &str) -> String {
    let Some(inner) = value.strip_prefix('"') else {
        return value.to_string();
    };
    let inner = inner.strip_suffix('"').unwrap_or(inner);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            _ => out.push(c),
        }
    }
    out
}

fn plain_filename(header: &str) -> Option<String> {
    parameter(header, "filename")
}

fn extended_filename(header: &str) -> Option<String> {
    let value = parameter(header, "filename*")?;
    // charset'language'percent-encoded-value
    let encoded = match value.splitn(3, '\'').collect::<Vec<_>>().as_slice() {
        [_charset, _language, encoded] => *encoded,
        _ => value.as_str(),
    };
    match urlencoding::decode(encoded) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_) => Some(encoded.to_string()),
    }
}

/// Keep only the final path component so a server cannot write outside `dir`.
fn sanitize(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        name.to_string()
    }
}
