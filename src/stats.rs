use std::collections::BTreeMap;

use crate::models::{MeasurementRecord, RegionSummary};

const LATENCY_DECIMALS: u32 = 2;
const UPTIME_DECIMALS: u32 = 3;
const P95: f64 = 95.0;

/// Round half away from zero to `decimals` places. Values too large to scale
/// are returned unchanged; they have no fractional digits to drop anyway.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Percentile by linear interpolation between the two nearest order statistics.
///
/// # Arguments
/// * `values` - Samples in any order
/// * `p` - Percentile in `[0, 100]`
///
/// # Returns
/// `None` for an empty sample set, otherwise the value at rank `p/100 * (n - 1)`
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Summarize every record tagged with `region`.
///
/// Uptime is read from `uptime_pct` only. `breaches` follows the latency list:
/// absent when the region has no latency samples.
pub fn summarize_region(
    records: &[MeasurementRecord],
    region: &str,
    threshold_ms: f64,
) -> RegionSummary {
    let mut latencies = Vec::new();
    let mut uptimes = Vec::new();

    for record in records
        .iter()
        .filter(|r| r.region.as_deref() == Some(region))
    {
        if let Some(latency) = record.latency_ms {
            latencies.push(latency);
        }
        if let Some(uptime) = record.uptime_pct {
            uptimes.push(uptime);
        }
    }

    // Summation order is fixed so results do not depend on record order.
    latencies.sort_by(f64::total_cmp);
    uptimes.sort_by(f64::total_cmp);

    let breaches = if latencies.is_empty() {
        None
    } else {
        Some(latencies.iter().filter(|&&l| l > threshold_ms).count() as u64)
    };

    RegionSummary {
        avg_latency: mean(&latencies).map(|v| round_to(v, LATENCY_DECIMALS)),
        p95_latency: percentile(&latencies, P95).map(|v| round_to(v, LATENCY_DECIMALS)),
        avg_uptime: mean(&uptimes).map(|v| round_to(v, UPTIME_DECIMALS)),
        breaches,
    }
}

/// Summarize each requested region. Duplicate names collapse into one entry
/// and unknown names map to an all-absent summary.
pub fn summarize(
    records: &[MeasurementRecord],
    regions: &[String],
    threshold_ms: f64,
) -> BTreeMap<String, RegionSummary> {
    let mut results = BTreeMap::new();
    for region in regions {
        let summary = summarize_region(records, region, threshold_ms);
        results.insert(region.clone(), summary);
    }
    results
}
