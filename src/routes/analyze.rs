use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::normalize::normalize_analysis;
use crate::summary::build_health_summary;
use crate::{AnalyzeResponse, AppError, DailyHealthRecord, DataScope, Provider, Result};

use super::SharedAnalyzer;

// ---

pub fn router() -> Router<SharedAnalyzer> {
    // ---
    Router::new().route("/api/analyze", post(handler))
}

async fn handler(
    State(analyzer): State<SharedAnalyzer>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>> {
    // ---
    info!("POST /api/analyze - Starting analysis");

    let Json(body) = payload.map_err(|e| {
        debug!("Rejected analyze body: {}", e);
        AppError::invalid_request(e.body_text())
    })?;
    let request = ParsedRequest::from_body(&body)?;

    info!(
        "Analyzing {} record(s), provider={}, scope={}",
        request.records.len(),
        request.provider.as_str(),
        request.scope.as_str()
    );

    // Step 1: Summarize
    let health_summary = build_health_summary(&request.records);

    // Step 2: Ask the model
    let raw = analyzer
        .analyze(request.provider, &health_summary)
        .await
        .map_err(|e| {
            error!("Analysis error: {}", e);
            e
        })?;

    // Step 3: Normalize into the response contract
    let response = normalize_analysis(&raw, request.provider, Utc::now());
    info!(
        "Analysis complete, score {} with {} recommendation(s)",
        response.score,
        response.recommendations.len()
    );
    Ok(Json(response))
}

/// Validated `POST /api/analyze` body.
#[derive(Debug)]
struct ParsedRequest {
    provider: Provider,
    scope: DataScope,
    records: Vec<DailyHealthRecord>,
}

impl ParsedRequest {
    fn from_body(body: &Value) -> Result<Self> {
        // ---
        let Some(items) = body.get("healthData").and_then(Value::as_array) else {
            return Err(AppError::invalid_request(
                "healthData must be an array of daily records",
            ));
        };

        let records = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                DailyHealthRecord::deserialize(item)
                    .map_err(|e| AppError::invalid_request(format!("healthData[{}]: {}", i, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        let provider = Provider::from_label(body.get("provider").and_then(Value::as_str));
        let scope = body
            .get("dataScope")
            .and_then(Value::as_str)
            .and_then(DataScope::from_label)
            .unwrap_or_default();

        Ok(Self {
            provider,
            scope,
            records,
        })
    }
}
