//! Report export and attachment upload

use std::fmt;
use std::str::FromStr;

use board_http::{ApiClient, ApiRequest, Download, FormPart, QueryString, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::segment;

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// Name used when the server sends no `Content-Disposition`.
    pub fn default_filename(&self) -> String {
        format!("board-report.{}", self.as_str())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unsupported export format: {other} (expected csv or json)")),
        }
    }
}

/// Attachment record returned after an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub file_name: String,
    pub size: u64,
}

pub async fn export_report(
    client: &ApiClient,
    board_id: &str,
    format: ExportFormat,
) -> Result<Download> {
    let query = QueryString::new()
        .push("boardId", board_id)
        .push("format", format);
    let request = ApiRequest::get("/reports/export").query(&query);
    let fallback = format.default_filename();
    let download = client.download(request, Some(fallback.as_str())).await?;
    info!(board_id, filename = %download.filename, bytes = download.data.len(), "exported report");
    Ok(download)
}

/// Upload one file as the `file` field of a multipart form.
pub async fn upload_attachment(
    client: &ApiClient,
    board_id: &str,
    file_name: &str,
    mime: Option<&str>,
    data: Vec<u8>,
) -> Result<Attachment> {
    let request = ApiRequest::post(format!("/boards/{}/attachments", segment(board_id)))
        .multipart(vec![FormPart::file("file", file_name, mime, data)]);
    client.send(request).await?.data()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{client, serve};
    use axum::Json;
    use axum::http::{HeaderMap, header};
    use axum::routing::{get, post};
    use serde_json::{Value, json};

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[tokio::test]
    async fn export_uses_server_filename() {
        let app = axum::Router::new().route(
            "/reports/export",
            get(|| async {
                (
                    [(header::CONTENT_DISPOSITION, r#"attachment; filename="b-1-throughput.csv""#)],
                    "period,completed\n2024-W01,5\n",
                )
            }),
        );
        let base = serve(app).await;

        let download = export_report(&client(&base), "b-1", ExportFormat::Csv)
            .await
            .unwrap();

        assert_eq!(download.filename, "b-1-throughput.csv");
        assert!(download.data.starts_with(b"period,completed"));
    }

    #[tokio::test]
    async fn export_without_disposition_uses_format_default() {
        let app = axum::Router::new().route("/reports/export", get(|| async { "{}" }));
        let base = serve(app).await;

        let download = export_report(&client(&base), "b-1", ExportFormat::Json)
            .await
            .unwrap();

        assert_eq!(download.filename, "board-report.json");
    }

    #[tokio::test]
    async fn upload_sends_multipart_with_boundary() {
        async fn handler(headers: HeaderMap, body: axum::body::Bytes) -> Json<Value> {
            let content_type = headers[header::CONTENT_TYPE].to_str().unwrap().to_string();
            assert!(
                content_type.starts_with("multipart/form-data; boundary="),
                "got: {content_type}"
            );
            assert!(String::from_utf8_lossy(&body).contains("filename=\"burndown.png\""));
            Json(json!({
                "success": true,
                "data": {"id": "att-1", "fileName": "burndown.png", "size": body.len()}
            }))
        }
        let app = axum::Router::new().route("/boards/{board_id}/attachments", post(handler));
        let base = serve(app).await;

        let attachment = upload_attachment(
            &client(&base),
            "b-1",
            "burndown.png",
            Some("image/png"),
            vec![0x89, b'P', b'N', b'G'],
        )
        .await
        .unwrap();

        assert_eq!(attachment.id, "att-1");
        assert_eq!(attachment.file_name, "burndown.png");
    }
}
