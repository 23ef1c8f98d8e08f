use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::{Config, ConfigOverrides};
use crate::output::{Language, ReportStyle};
use crate::roster::{ChangeEvent, RosterError};
use crate::scanner::scan_sheet;
use crate::workbook::{Workbook, WorkbookError};

#[derive(Clone)]
struct ApiState {
    config: Config,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

// Everything the caller can fix by sending a different request or file is a 400.
impl From<RosterError> for ApiError {
    fn from(error: RosterError) -> Self {
        Self::bad_request(error.to_string())
    }
}

// keeps axum's status, so an oversized upload stays a 413
impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        Self {
            status: error.status(),
            message: error.body_text(),
        }
    }
}

impl From<WorkbookError> for ApiError {
    fn from(error: WorkbookError) -> Self {
        Self::bad_request(error.to_string())
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

/// Form fields of an upload, collected from a multipart body.
#[derive(Debug, Default)]
struct ReportUpload {
    file: Option<Vec<u8>>,
    sheet: Option<String>,
    cutoff: Option<String>,
    overrides: ConfigOverrides,
}

impl ReportUpload {
    fn set_text(&mut self, name: &str, value: String) -> std::result::Result<(), ApiError> {
        let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
        match name {
            "sheet" => self.sheet = value,
            "cutoff" => self.cutoff = value,
            "start_header" => self.overrides.start_header = value,
            "end_header" => self.overrides.end_header = value,
            "participant_header" => self.overrides.participant_header = value,
            "function_header" => self.overrides.function_header = value,
            "style" => {
                self.overrides.style = value
                    .map(|v| v.parse::<ReportStyle>())
                    .transpose()
                    .map_err(|e| ApiError::bad_request(e.to_string()))?
            }
            "language" => {
                self.overrides.language = value
                    .map(|v| v.parse::<Language>())
                    .transpose()
                    .map_err(|e| ApiError::bad_request(e.to_string()))?
            }
            other => warn!("ignoring unknown form field: {other}"),
        }
        Ok(())
    }

    fn take_file(&mut self) -> std::result::Result<Vec<u8>, ApiError> {
        self.file
            .take()
            .filter(|bytes| !bytes.is_empty())
            .ok_or_else(|| ApiError::bad_request("please upload an Excel file in the 'file' field"))
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct SheetsResponse {
    sheets: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ReportResponse {
    sheet: String,
    cutoff: String,
    joined: Vec<ChangeEvent>,
    left: Vec<ChangeEvent>,
    unparseable: usize,
    report: String,
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, router(config)).await?;
    Ok(())
}

fn router(config: Config) -> Router {
    let body_limit = config.server.max_upload_mb.saturating_mul(1024 * 1024);
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let state = ApiState { config };

    Router::new()
        .route("/health", get(health))
        .route("/v1/config", get(show_config))
        .route("/v1/sheets", post(sheets))
        .route("/v1/report", post(report))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse { status: "ok" })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config)
}

async fn sheets(multipart: Multipart) -> ApiResult<SheetsResponse> {
    let mut upload = read_upload(multipart).await?;
    let bytes = upload.take_file()?;
    let sheets = tokio::task::spawn_blocking(move || {
        Workbook::from_bytes(bytes).map(|workbook| workbook.sheet_names())
    })
    .await
    .map_err(ApiError::internal)??;
    Ok(ok(SheetsResponse { sheets }))
}

async fn report(State(state): State<ApiState>, multipart: Multipart) -> ApiResult<ReportResponse> {
    let upload = read_upload(multipart).await?;
    let response = tokio::task::spawn_blocking(move || build_report(&state.config, upload))
        .await
        .map_err(ApiError::internal)??;
    Ok(ok(response))
}

async fn read_upload(mut multipart: Multipart) -> std::result::Result<ReportUpload, ApiError> {
    let mut upload = ReportUpload::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            upload.file = Some(field.bytes().await?.to_vec());
        } else {
            let text = field.text().await?;
            upload.set_text(&name, text)?;
        }
    }
    Ok(upload)
}

fn build_report(
    config: &Config,
    mut upload: ReportUpload,
) -> std::result::Result<ReportResponse, ApiError> {
    let bytes = upload.take_file()?;
    let cutoff = upload
        .cutoff
        .take()
        .ok_or_else(|| ApiError::bad_request("missing 'cutoff' field (DD.MM.YYYY)"))?;

    let mut effective = config.clone();
    effective.apply_overrides(upload.overrides);

    let mut workbook = Workbook::from_bytes(bytes)?;
    let sheet = workbook.sheet(upload.sheet.as_deref())?;
    let outcome = scan_sheet(
        &sheet,
        &cutoff,
        &effective.header_spec(),
        &effective.report_options(),
    )?;

    Ok(ReportResponse {
        sheet: outcome.sheet,
        cutoff: outcome.cutoff.to_string(),
        joined: outcome.changes.joined,
        left: outcome.changes.left,
        unparseable: outcome.changes.unparseable,
        report: outcome.report,
    })
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}
