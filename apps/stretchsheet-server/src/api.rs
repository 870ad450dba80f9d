//! API handlers for the stretchsheet server
//!
//! One multipart CSV upload in, two PDF documents out: either together
//! as base64 JSON, or one at a time as direct downloads with the fixed
//! artifact file names.

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use base64::Engine;
use serde::Serialize;
use tracing::info;

use stretchsheet_core::{parse_records, render_names, render_numbers, RenderedSheet, SheetFont};

use crate::error::ServerError;
use crate::AppState;

/// Fixed artifact file names offered to the browser.
const NAMES_FILE: &str = "names.pdf";
const NUMBERS_FILE: &str = "numbers_full_stretch.pdf";
const PDF_MIME: &str = "application/pdf";

/// Upload form, embedded at compile time.
const INDEX_HTML: &str = include_str!("../assets/index.html");
/// Sample input, offered for download byte-for-byte unchanged.
const SAMPLE_CSV: &str = include_str!("../assets/sample.csv");

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "stretchsheet-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: GET /
pub async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Handler: GET /api/sample
pub async fn handle_sample() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"sample.csv\"",
            ),
        ],
        SAMPLE_CSV,
    )
}

/// One rendered document in the JSON response
#[derive(Serialize)]
pub struct SheetArtifact {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub page_count: usize,
    /// Base64-encoded PDF bytes
    pub data_base64: String,
}

impl SheetArtifact {
    fn new(file_name: &'static str, sheet: &RenderedSheet) -> Self {
        let engine = base64::engine::general_purpose::STANDARD;
        Self {
            file_name,
            mime_type: PDF_MIME,
            page_count: sheet.page_count,
            data_base64: engine.encode(&sheet.bytes),
        }
    }
}

/// Response for POST /api/sheets
#[derive(Serialize)]
pub struct SheetsResponse {
    pub success: bool,
    pub record_count: usize,
    pub names: SheetArtifact,
    pub numbers: SheetArtifact,
}

/// Handler: POST /api/sheets, rendering both documents in one pass
pub async fn handle_generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SheetsResponse>, ServerError> {
    let upload = read_upload(multipart).await?;
    let (record_count, names, numbers) = render_both(&upload, state.font)?;

    Ok(Json(SheetsResponse {
        success: true,
        record_count,
        names: SheetArtifact::new(NAMES_FILE, &names),
        numbers: SheetArtifact::new(NUMBERS_FILE, &numbers),
    }))
}

/// Handler: POST /api/sheets/names, a direct PDF download
pub async fn handle_names_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let upload = read_upload(multipart).await?;
    let records = parse_records(&upload)?;
    info!(records = records.len(), "rendering name sheet");

    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    let sheet = render_names(&names, state.font)?;
    Ok(pdf_download(NAMES_FILE, sheet))
}

/// Handler: POST /api/sheets/numbers, a direct PDF download
pub async fn handle_numbers_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let upload = read_upload(multipart).await?;
    let records = parse_records(&upload)?;
    info!(records = records.len(), "rendering number sheet");

    let numbers: Vec<i64> = records.iter().map(|r| r.number).collect();
    let sheet = render_numbers(&numbers, state.font)?;
    Ok(pdf_download(NUMBERS_FILE, sheet))
}

fn render_both(
    csv: &[u8],
    font: &SheetFont,
) -> Result<(usize, RenderedSheet, RenderedSheet), ServerError> {
    let records = parse_records(csv)?;
    info!(records = records.len(), "rendering both sheets");

    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    let numbers: Vec<i64> = records.iter().map(|r| r.number).collect();

    let name_sheet = render_names(&names, font)?;
    let number_sheet = render_numbers(&numbers, font)?;
    Ok((records.len(), name_sheet, number_sheet))
}

/// Pull the uploaded CSV out of the multipart form. The field is named
/// `file`; failing that, the first field carrying a file name wins.
async fn read_upload(mut multipart: Multipart) -> Result<Bytes, ServerError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::Upload(e.to_string()))?
    {
        if field.name() == Some("file") || field.file_name().is_some() {
            return field
                .bytes()
                .await
                .map_err(|e| ServerError::Upload(e.to_string()));
        }
    }
    Err(ServerError::InvalidRequest(
        "multipart field 'file' is required".to_string(),
    ))
}

fn pdf_download(file_name: &'static str, sheet: RenderedSheet) -> Response {
    (
        [
            (header::CONTENT_TYPE, PDF_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        sheet.bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = handle_health().await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.service, "stretchsheet-server");
    }

    #[test]
    fn test_sample_csv_matches_expected_layout() {
        assert!(SAMPLE_CSV.starts_with("name,number"));
        let records = parse_records(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(records.len(), 5);
    }

    #[test]
    fn test_index_page_points_at_the_api() {
        assert!(INDEX_HTML.contains("/api/sheets/names"));
        assert!(INDEX_HTML.contains("/api/sheets/numbers"));
        assert!(INDEX_HTML.contains("/api/sample"));
    }
}
