//! System-wide default constants.
//!
//! Centralises the file names and economic defaults the planner falls back to
//! when `planner_config.toml` does not override them.

// ============================================================================
// Workspace
// ============================================================================

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CO2BLOCK_CONFIG";

/// Config file looked up in the current working directory.
pub const LOCAL_CONFIG_FILE: &str = "planner_config.toml";

/// Single-row reservoir profile table handed to the simulator.
pub const PROFILE_FILE_NAME: &str = "reservoir_profile.csv";

/// Example reservoir inputs and storage table shipped with the planner.
pub const EXAMPLE_FILES: [&str; 2] = ["data/example_inputs.csv", "data/example_V_M.csv"];

/// Lock file guarding a workspace against concurrent simulator runs.
pub const RUN_LOCK_FILE_NAME: &str = ".co2block-run.lock";

// ============================================================================
// Simulator Outputs
// ============================================================================

/// Artifacts written by CO2BLOCK on a successful run, in publication order.
pub const DEFAULT_ARTIFACTS: [&str; 4] = [
    "co2block_summary.csv",
    "d_max.csv",
    "Q_M_max.csv",
    "V_M_max.csv",
];

/// Flow-rate table (well count x distance).
pub const DEFAULT_FLOW_TABLE: &str = "Q_M_max.csv";

/// Storage table (well count x distance).
pub const DEFAULT_STORAGE_TABLE: &str = "V_M_max.csv";

/// Revenue optimization report written next to the simulator outputs.
pub const DEFAULT_OPTIMIZE_REPORT: &str = "optimize.json";

// ============================================================================
// Result Tables
// ============================================================================

/// Header of the first column in storage/flow tables.
pub const WELL_COUNT_COLUMN: &str = "number_of_wells";

/// Delimiter splitting a distance column label into tokens.
pub const DISTANCE_DELIMITER: &str = "_";

/// Token index holding the distance in a column label (`V_M_max_d_1000` -> `1000`).
pub const DISTANCE_TOKEN_INDEX: usize = 4;

// ============================================================================
// Economics
// ============================================================================

/// Capture cost per tonne of CO2 when the caller does not specify one.
pub const DEFAULT_CAPTURE_RATE: f64 = 50.0;

/// Transport cost per tonne of CO2 when the caller does not specify one.
pub const DEFAULT_TRANSPORT_RATE: f64 = 8.0;

/// Unit revenue rates plotted when a request omits them.
pub const DEFAULT_REVENUE_RATES: [f64; 3] = [60.0, 80.0, 100.0];

/// Title used when the reservoir has no usable name.
pub const UNKNOWN_RESERVOIR_TITLE: &str = "Unknown";
