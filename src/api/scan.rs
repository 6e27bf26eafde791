use super::AppState;
use crate::domain::{Mint, NumberedBuy, PricedBuy, TimeS};
use crate::error::AppError;
use crate::scan::ScanRequest;
use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanParams {
    pub token_address: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_price: Option<f64>,
    pub timezone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub token_address: String,
    pub total_buys: usize,
    pub numbered_buys: Vec<NumberedBuy>,
    pub analysis_complete: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanAllResponse {
    pub token_address: String,
    pub total_transactions: usize,
    pub buys: Vec<PricedBuy>,
    pub scan_complete: bool,
}

pub async fn analyze_token(
    State(state): State<AppState>,
    Json(params): Json<ScanParams>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let request = parse_scan_request(&params)?;
    let timezone = parse_timezone(params.timezone.as_deref())?;

    info!("Analyzing token {} for draw buys", request.token);
    let cancel = CancellationToken::new();
    let report = state
        .orchestrator
        .run_draw(&request, params.min_price, timezone, &cancel)
        .await?;

    Ok(Json(AnalyzeResponse {
        token_address: request.token.as_str().to_string(),
        total_buys: report.total_buys,
        numbered_buys: report.numbered_buys,
        analysis_complete: true,
    }))
}

pub async fn scan_all_buys(
    State(state): State<AppState>,
    Json(params): Json<ScanParams>,
) -> Result<Json<ScanAllResponse>, AppError> {
    let request = parse_scan_request(&params)?;

    info!("Scanning {} for all buys", request.token);
    let cancel = CancellationToken::new();
    let summary = state.orchestrator.scan_all(&request, &cancel).await?;

    Ok(Json(ScanAllResponse {
        token_address: request.token.as_str().to_string(),
        total_transactions: summary.total_transactions,
        buys: summary.buys,
        scan_complete: true,
    }))
}

fn parse_scan_request(params: &ScanParams) -> Result<ScanRequest, AppError> {
    let token = match params.token_address.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => Mint::new(t.to_string()),
        _ => return Err(AppError::BadRequest("Token address is required".into())),
    };

    let start = parse_date(params.start_date.as_deref(), TimeS::new(0), "startDate")?;
    let end = parse_date(
        params.end_date.as_deref(),
        TimeS::new(Utc::now().timestamp()),
        "endDate",
    )?;

    Ok(ScanRequest { token, start, end })
}

fn parse_date(value: Option<&str>, default: TimeS, field: &str) -> Result<TimeS, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(default),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| TimeS::new(dt.timestamp()))
            .map_err(|_| {
                AppError::BadRequest(format!("Invalid {field}: expected an RFC 3339 date"))
            }),
    }
}

fn parse_timezone(value: Option<&str>) -> Result<Tz, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(chrono_tz::UTC),
        Some(s) => s
            .parse::<Tz>()
            .map_err(|_| AppError::BadRequest(format!("Unknown timezone: {s}"))),
    }
}
