//! Economics Module - cost and revenue of storage configurations
//!
//! ## Pipeline
//!
//! ```text
//! WellStorage[] ──► CostModel::cost_profile() ──► CostedWell[]
//!                                                    │
//!                         revenue rates ──► build_revenue_series()
//!                                                    │
//!                                                    ▼
//!                                           OptimizationReport
//! ```

pub mod cost;
pub mod revenue;

pub use cost::{CostModel, CostedWell};
pub use revenue::{build_revenue_series, RevenuePoint, RevenueSeries};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EconomicsConfig;

// ============================================================================
// Request
// ============================================================================

/// Rates supplied with an optimization request. Missing values fall back to
/// the `[economics]` config section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueRates {
    #[serde(default)]
    pub capture_cost: Option<f64>,
    #[serde(default)]
    pub transport_cost: Option<f64>,
    #[serde(default)]
    pub revenue: Vec<f64>,
}

impl RevenueRates {
    /// Resolve `(capture, transport, revenue rates)` against config defaults.
    pub fn resolve(&self, defaults: &EconomicsConfig) -> (f64, f64, Vec<f64>) {
        let revenue = if self.revenue.is_empty() {
            defaults.revenue_rates.clone()
        } else {
            self.revenue.clone()
        };
        (
            self.capture_cost.unwrap_or(defaults.capture_rate),
            self.transport_cost.unwrap_or(defaults.transport_rate),
            revenue,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    /// Re-read the storage table of the last simulator run instead of the
    /// uploaded table.
    pub read_outputs: bool,
    #[serde(default)]
    pub rates: RevenueRates,
}

// ============================================================================
// Report
// ============================================================================

/// Where the storage profile of a report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSource {
    SimulatorOutputs,
    UploadedTable,
}

/// Everything a renderer needs to draw the net revenue plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationReport {
    pub title: String,
    pub source: ReportSource,
    pub capture_rate: f64,
    pub transport_rate: f64,
    pub costed: Vec<CostedWell>,
    pub series: Vec<RevenueSeries>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_parses_wire_shape() {
        let request: OptimizeRequest = serde_json::from_str(
            r#"{"readOutputs": true, "rates": {"capture_cost": 45, "transport_cost": 6.5, "revenue": [70, 90]}}"#,
        )
        .unwrap();
        assert!(request.read_outputs);
        assert_eq!(request.rates.capture_cost, Some(45.0));
        assert_eq!(request.rates.revenue, vec![70.0, 90.0]);
    }

    #[test]
    fn test_missing_rates_fall_back_to_config() {
        let request: OptimizeRequest = serde_json::from_str(r#"{"readOutputs": false}"#).unwrap();
        let (capture, transport, revenue) = request.rates.resolve(&EconomicsConfig::default());
        assert_eq!(capture, 50.0);
        assert_eq!(transport, 8.0);
        assert_eq!(revenue, vec![60.0, 80.0, 100.0]);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = OptimizationReport {
            title: "Unknown".to_string(),
            source: ReportSource::UploadedTable,
            capture_rate: 50.0,
            transport_rate: 8.0,
            costed: vec![],
            series: build_revenue_series(&[], &[60.0]),
            generated_at: Utc::now(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["source"], "uploaded_table");
        assert_eq!(json["captureRate"], 50.0);
        assert!(json["series"][0]["breakevenWellCounts"].is_array());
        assert!(json.get("generatedAt").is_some());
    }
}
