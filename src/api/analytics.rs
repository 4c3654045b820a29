use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::{
    api::AnalyticsState,
    metrics::{self, RequestTimer},
    models::{AnalyticsResponse, MetricsQuery, RegionsResponse},
    stats,
    AnalyticsError,
    Result,
};

pub async fn summarize_regions(
    State(state): State<AnalyticsState>,
    payload: std::result::Result<Json<MetricsQuery>, JsonRejection>,
) -> Result<Json<AnalyticsResponse>> {
    let _timer = RequestTimer::new("analytics");
    let Json(query) = payload?;

    if !query.threshold_ms.is_finite() {
        return Err(AnalyticsError::InvalidRequest(
            "threshold_ms must be a finite number".to_string(),
        ));
    }

    info!(
        "Summarizing {} regions with threshold {}ms",
        query.regions.len(),
        query.threshold_ms
    );

    let regions = stats::summarize(state.dataset.records(), &query.regions, query.threshold_ms);

    let empty = regions.values().filter(|s| s.is_empty()).count();
    debug!("{} of {} summaries have no samples", empty, regions.len());
    metrics::record_summaries(regions.len(), empty);

    Ok(Json(AnalyticsResponse { regions }))
}

pub async fn list_regions(State(state): State<AnalyticsState>) -> Json<RegionsResponse> {
    let _timer = RequestTimer::new("regions");
    Json(RegionsResponse {
        regions: state.dataset.regions(),
    })
}

pub async fn health_check(State(state): State<AnalyticsState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "records": state.dataset.len(),
    }))
}

pub async fn export_metrics() -> Result<impl IntoResponse> {
    let body = metrics::render()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}
