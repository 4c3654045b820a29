use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One latency/uptime sample as it appears in the dataset file.
///
/// Every field is optional so that partially filled rows still load. A row
/// without `region` never matches any query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub latency_ms: Option<f64>,
    /// Uptime on a percentage scale, e.g. `97.264`.
    #[serde(default)]
    pub uptime_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsQuery {
    pub regions: Vec<String>,
    pub threshold_ms: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub avg_latency: Option<f64>,
    pub p95_latency: Option<f64>,
    pub avg_uptime: Option<f64>,
    pub breaches: Option<u64>,
}

impl RegionSummary {
    /// Summary for a region with no contributing samples.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.avg_latency.is_none()
            && self.p95_latency.is_none()
            && self.avg_uptime.is_none()
            && self.breaches.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub regions: BTreeMap<String, RegionSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegionsResponse {
    pub regions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_tolerates_missing_and_extra_fields() {
        let record: MeasurementRecord = serde_json::from_value(json!({
            "service": "checkout",
            "latency_ms": 120.5,
            "uptime": 0.97
        }))
        .unwrap();

        assert_eq!(record.region, None);
        assert_eq!(record.latency_ms, Some(120.5));
        assert_eq!(record.uptime_pct, None);
    }

    #[test]
    fn test_record_accepts_explicit_nulls() {
        let record: MeasurementRecord = serde_json::from_value(json!({
            "region": "emea",
            "latency_ms": null,
            "uptime_pct": null
        }))
        .unwrap();

        assert_eq!(record.region.as_deref(), Some("emea"));
        assert!(record.latency_ms.is_none());
        assert!(record.uptime_pct.is_none());
    }

    #[test]
    fn test_query_requires_both_fields() {
        assert!(serde_json::from_value::<MetricsQuery>(json!({ "regions": ["emea"] })).is_err());
        assert!(serde_json::from_value::<MetricsQuery>(json!({ "threshold_ms": 180 })).is_err());
        assert!(serde_json::from_value::<MetricsQuery>(json!({
            "regions": "emea",
            "threshold_ms": 180
        }))
        .is_err());

        let query: MetricsQuery = serde_json::from_value(json!({
            "regions": ["emea", "apac"],
            "threshold_ms": 180
        }))
        .unwrap();
        assert_eq!(query.regions, vec!["emea", "apac"]);
        assert_eq!(query.threshold_ms, 180.0);
    }

    #[test]
    fn test_empty_summary_serializes_nulls() {
        let value = serde_json::to_value(RegionSummary::empty()).unwrap();
        assert_eq!(
            value,
            json!({
                "avg_latency": null,
                "p95_latency": null,
                "avg_uptime": null,
                "breaches": null
            })
        );
    }
}
