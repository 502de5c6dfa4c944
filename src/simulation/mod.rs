//! Simulation Module - CO2BLOCK invocation protocol
//!
//! ## Run Sequence
//!
//! 1. `RunLock::acquire()` - reject the run if another one holds the workspace
//! 2. `clear_stale_artifacts()` - remove outputs of the previous run
//! 3. `SimulationInvoker::invoke()` - launch the executable and classify the result
//!
//! The executable is a black box: run limits are forwarded verbatim as
//! positional arguments and the executable validates physical ranges itself.

mod artifacts;
mod invoker;
mod lock;

pub use artifacts::{clear_stale_artifacts, list_artifacts};
pub use invoker::{build_args, SimulationInvoker};
pub use lock::RunLock;

use serde::{Deserialize, Serialize};

// ============================================================================
// Run Limits
// ============================================================================

/// A run-limit scalar kept in the JSON type it was submitted with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LimitValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for LimitValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitValue::Integer(v) => write!(f, "{v}"),
            // Keeps the fractional part of whole floats: 10.0, not 10
            LimitValue::Float(v) => write!(f, "{v:?}"),
            LimitValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for LimitValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for LimitValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for LimitValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Scenario parameters bounding one simulation sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunLimits {
    pub correction: LimitValue,
    /// Injection time horizon in years.
    pub injection_time: LimitValue,
    pub min_distance: LimitValue,
    pub max_distance: LimitValue,
    /// Number of candidate distances between min and max.
    pub num_distance: LimitValue,
    pub max_well_num: LimitValue,
    pub well_radius: LimitValue,
    /// Maximum injection rate per well.
    #[serde(rename = "maxQ")]
    pub max_q: LimitValue,
}

// ============================================================================
// Run Outcome
// ============================================================================

/// Classified result of one simulator invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Exit code 0; outputs are on disk.
    Success,
    /// The process could not be started (missing binary, permissions).
    LaunchError { cause: String },
    /// The process ran and exited non-zero. Signal deaths report -1.
    ExecutionError { exit_code: i32, stderr: String },
    /// The deadline expired and the process was killed.
    Timeout { seconds: u64 },
    /// The caller cancelled the run and the process was killed.
    Cancelled,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success)
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RunOutcome::Success => Some(0),
            RunOutcome::ExecutionError { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    /// Human-readable summary for the caller.
    pub fn describe(&self) -> String {
        match self {
            RunOutcome::Success => "CO2BLOCK ran successfully".to_string(),
            RunOutcome::LaunchError { cause } => format!("could not start CO2BLOCK: {cause}"),
            RunOutcome::ExecutionError { exit_code, stderr } => {
                format!("returncode:{exit_code}\n{stderr}")
            }
            RunOutcome::Timeout { seconds } => {
                format!("CO2BLOCK exceeded the {seconds}s deadline and was terminated")
            }
            RunOutcome::Cancelled => "CO2BLOCK run was cancelled".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_limits_keep_submitted_json_types() {
        let limits: RunLimits = serde_json::from_str(
            r#"{
                "correction": "on",
                "injectionTime": 30,
                "minDistance": 1.5,
                "maxDistance": "10",
                "numDistance": 5,
                "maxWellNum": 20,
                "wellRadius": 0.1,
                "maxQ": 1e6
            }"#,
        )
        .unwrap();

        assert_eq!(limits.correction, LimitValue::Text("on".to_string()));
        assert_eq!(limits.injection_time, LimitValue::Integer(30));
        assert_eq!(limits.min_distance, LimitValue::Float(1.5));
        assert_eq!(limits.max_distance, LimitValue::Text("10".to_string()));
        assert_eq!(limits.max_q.to_string(), "1000000.0");
    }

    #[test]
    fn test_whole_float_limit_keeps_its_decimal_point() {
        assert_eq!(LimitValue::Float(10.0).to_string(), "10.0");
        assert_eq!(LimitValue::Float(0.5).to_string(), "0.5");
        assert_eq!(LimitValue::Integer(10).to_string(), "10");
    }

    #[test]
    fn test_outcome_describe_matches_exit_report() {
        let outcome = RunOutcome::ExecutionError {
            exit_code: 2,
            stderr: "permeability out of range".to_string(),
        };
        assert_eq!(outcome.describe(), "returncode:2\npermeability out of range");
        assert_eq!(outcome.exit_code(), Some(2));
        assert!(!outcome.is_success());
        assert_eq!(RunOutcome::Cancelled.exit_code(), None);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(RunOutcome::Timeout { seconds: 30 }).unwrap();
        assert_eq!(json["status"], "timeout");
        assert_eq!(json["seconds"], 30);
    }
}
