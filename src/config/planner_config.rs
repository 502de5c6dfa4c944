//! Planner Configuration - simulator location, workspace paths, table layout
//! and economic defaults as operator-tunable TOML values.
//!
//! Each struct implements `Default`, so an empty or missing file yields a
//! working configuration rooted in the current directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a planner deployment.
///
/// Load with `PlannerConfig::load()` which searches:
/// 1. `$CO2BLOCK_CONFIG` env var
/// 2. `./planner_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// External simulator executable
    #[serde(default)]
    pub simulator: SimulatorConfig,

    /// Workspace and data locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Names of the artifacts the simulator produces
    #[serde(default)]
    pub outputs: OutputsConfig,

    /// Label conventions of the result tables
    #[serde(default)]
    pub tables: TableLayout,

    /// Cost and revenue defaults
    #[serde(default)]
    pub economics: EconomicsConfig,
}

impl PlannerConfig {
    /// Load configuration using the standard search order:
    /// 1. `$CO2BLOCK_CONFIG` environment variable
    /// 2. `./planner_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded planner config from CO2BLOCK_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from CO2BLOCK_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "CO2BLOCK_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded planner config from ./planner_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./planner_config.toml, using defaults");
                }
            }
        }

        info!("No planner_config.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document. Unknown keys only warn.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Planner config saved");
        Ok(())
    }

    /// Validate the configuration for internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.simulator.executable.as_os_str().is_empty() {
            errors.push("simulator.executable must not be empty".to_string());
        }

        let o = &self.outputs;
        if o.artifacts.is_empty() {
            errors.push("outputs.artifacts must list at least one file".to_string());
        }
        if !o.artifacts.contains(&o.storage_table) {
            errors.push(format!(
                "outputs.storage_table '{}' is not listed in outputs.artifacts",
                o.storage_table
            ));
        }
        if !o.artifacts.contains(&o.flow_table) {
            errors.push(format!(
                "outputs.flow_table '{}' is not listed in outputs.artifacts",
                o.flow_table
            ));
        }
        if o.optimize_report.trim().is_empty() {
            errors.push("outputs.optimize_report must not be empty".to_string());
        }
        if o.artifacts.contains(&o.optimize_report) {
            errors.push(format!(
                "outputs.optimize_report '{}' collides with a simulator artifact",
                o.optimize_report
            ));
        }

        if self.tables.well_count_column.trim().is_empty() {
            errors.push("tables.well_count_column must not be empty".to_string());
        }
        if self.tables.distance_delimiter.is_empty() {
            errors.push("tables.distance_delimiter must not be empty".to_string());
        }

        let e = &self.economics;
        Self::check_rate(e.capture_rate, "economics.capture_rate", &mut errors);
        Self::check_rate(e.transport_rate, "economics.transport_rate", &mut errors);
        for (i, rate) in e.revenue_rates.iter().enumerate() {
            Self::check_rate(*rate, &format!("economics.revenue_rates[{i}]"), &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_rate(value: f64, name: &str, errors: &mut Vec<String>) {
        if !value.is_finite() {
            errors.push(format!("{name}: must be a finite number (got {value})"));
        } else if value < 0.0 {
            errors.push(format!("{name}: cannot be negative (got {value:.3})"));
        }
    }

    /// Anchor a relative workspace and a relative simulator path at the
    /// current directory. The simulator runs inside the workspace, where the
    /// original relative paths would no longer resolve.
    ///
    /// A bare executable name (no directory part) is left for `PATH` lookup.
    #[must_use]
    pub fn with_absolute_paths(mut self) -> Self {
        let cwd = match std::env::current_dir() {
            Ok(cwd) => cwd,
            Err(e) => {
                warn!(error = %e, "Cannot determine current directory, keeping relative paths");
                return self;
            }
        };

        if self.paths.workspace_dir.is_relative() {
            self.paths.workspace_dir = cwd.join(&self.paths.workspace_dir);
        }
        let executable = &self.simulator.executable;
        if executable.is_relative() && executable.components().count() > 1 {
            self.simulator.executable = cwd.join(executable);
        }
        self
    }

    /// Directory the simulator writes its artifacts to.
    pub fn outputs_dir(&self) -> PathBuf {
        self.paths.workspace_dir.join(&self.paths.outputs_dir)
    }

    /// Location of the stored single-row reservoir profile.
    pub fn profile_path(&self) -> PathBuf {
        self.paths.workspace_dir.join(&self.paths.profile_file)
    }

    /// Reservoir catalog location, relative paths resolved against the workspace.
    pub fn catalog_path(&self) -> PathBuf {
        self.paths.workspace_dir.join(&self.paths.reservoir_catalog)
    }

    /// Example input and storage tables offered to new users.
    pub fn example_file_paths(&self) -> Vec<PathBuf> {
        self.paths
            .example_files
            .iter()
            .map(|file| self.paths.workspace_dir.join(file))
            .collect()
    }

    pub fn storage_table_path(&self) -> PathBuf {
        self.outputs_dir().join(&self.outputs.storage_table)
    }

    pub fn flow_table_path(&self) -> PathBuf {
        self.outputs_dir().join(&self.outputs.flow_table)
    }

    pub fn optimize_report_path(&self) -> PathBuf {
        self.outputs_dir().join(&self.outputs.optimize_report)
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Simulator Config
// ============================================================================

/// Where the CO2BLOCK executable lives and how long a run may take.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Path to the simulator executable.
    #[serde(default = "default_executable")]
    pub executable: PathBuf,

    /// Wall-clock limit for one run in seconds. 0 disables the deadline.
    #[serde(default)]
    pub timeout_secs: u64,
}

fn default_executable() -> PathBuf {
    PathBuf::from("bin/CO2BLOCK")
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            timeout_secs: 0,
        }
    }
}

impl SimulatorConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

// ============================================================================
// Paths Config
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the session workspace; relative paths below resolve against it.
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,

    /// Directory the simulator writes its artifacts to.
    #[serde(default = "default_outputs_dir")]
    pub outputs_dir: PathBuf,

    /// File name of the stored reservoir profile.
    #[serde(default = "default_profile_file")]
    pub profile_file: String,

    /// CSV catalog of known reservoirs.
    #[serde(default = "default_reservoir_catalog")]
    pub reservoir_catalog: PathBuf,

    /// Example reservoir input and storage tables.
    #[serde(default = "default_example_files")]
    pub example_files: Vec<PathBuf>,
}

fn default_workspace_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_outputs_dir() -> PathBuf {
    PathBuf::from("outputs")
}
fn default_profile_file() -> String {
    defaults::PROFILE_FILE_NAME.to_string()
}
fn default_reservoir_catalog() -> PathBuf {
    PathBuf::from("data/reservoirs.csv")
}
fn default_example_files() -> Vec<PathBuf> {
    defaults::EXAMPLE_FILES.iter().map(PathBuf::from).collect()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            workspace_dir: default_workspace_dir(),
            outputs_dir: default_outputs_dir(),
            profile_file: default_profile_file(),
            reservoir_catalog: default_reservoir_catalog(),
            example_files: default_example_files(),
        }
    }
}

// ============================================================================
// Outputs Config
// ============================================================================

/// Simulator artifact names. The storage and flow tables are named explicitly
/// instead of being picked out of the list by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputsConfig {
    #[serde(default = "default_artifacts")]
    pub artifacts: Vec<String>,

    #[serde(default = "default_storage_table")]
    pub storage_table: String,

    #[serde(default = "default_flow_table")]
    pub flow_table: String,

    #[serde(default = "default_optimize_report")]
    pub optimize_report: String,
}

fn default_artifacts() -> Vec<String> {
    defaults::DEFAULT_ARTIFACTS.iter().map(ToString::to_string).collect()
}
fn default_storage_table() -> String {
    defaults::DEFAULT_STORAGE_TABLE.to_string()
}
fn default_flow_table() -> String {
    defaults::DEFAULT_FLOW_TABLE.to_string()
}
fn default_optimize_report() -> String {
    defaults::DEFAULT_OPTIMIZE_REPORT.to_string()
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            artifacts: default_artifacts(),
            storage_table: default_storage_table(),
            flow_table: default_flow_table(),
            optimize_report: default_optimize_report(),
        }
    }
}

// ============================================================================
// Table Layout
// ============================================================================

/// Label conventions shared by the storage, flow and uploaded tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableLayout {
    /// Header of the well-count label column.
    #[serde(default = "default_well_count_column")]
    pub well_count_column: String,

    /// Delimiter splitting distance column labels into tokens.
    #[serde(default = "default_distance_delimiter")]
    pub distance_delimiter: String,

    /// Index of the distance token within a column label.
    #[serde(default = "default_distance_token_index")]
    pub distance_token_index: usize,
}

fn default_well_count_column() -> String {
    defaults::WELL_COUNT_COLUMN.to_string()
}
fn default_distance_delimiter() -> String {
    defaults::DISTANCE_DELIMITER.to_string()
}
fn default_distance_token_index() -> usize {
    defaults::DISTANCE_TOKEN_INDEX
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            well_count_column: default_well_count_column(),
            distance_delimiter: default_distance_delimiter(),
            distance_token_index: default_distance_token_index(),
        }
    }
}

// ============================================================================
// Economics Config
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomicsConfig {
    /// Capture cost rate used when a request leaves it out.
    #[serde(default = "default_capture_rate")]
    pub capture_rate: f64,

    /// Transport cost rate used when a request leaves it out.
    #[serde(default = "default_transport_rate")]
    pub transport_rate: f64,

    /// Unit revenue rates used when a request lists none.
    #[serde(default = "default_revenue_rates")]
    pub revenue_rates: Vec<f64>,
}

fn default_capture_rate() -> f64 {
    defaults::DEFAULT_CAPTURE_RATE
}
fn default_transport_rate() -> f64 {
    defaults::DEFAULT_TRANSPORT_RATE
}
fn default_revenue_rates() -> Vec<f64> {
    defaults::DEFAULT_REVENUE_RATES.to_vec()
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            capture_rate: default_capture_rate(),
            transport_rate: default_transport_rate(),
            revenue_rates: default_revenue_rates(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = PlannerConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: PlannerConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config.outputs.storage_table, "V_M_max.csv");
        assert_eq!(config.outputs.flow_table, "Q_M_max.csv");
        assert_eq!(config.tables.distance_token_index, 4);
        assert_eq!(config.economics.capture_rate, 50.0);
        assert_eq!(config.economics.transport_rate, 8.0);
        assert_eq!(config.simulator.timeout(), None);
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[simulator]
executable = "/opt/co2block/CO2BLOCK"
timeout_secs = 900

[economics]
capture_rate = 42.5
"#;
        let config = PlannerConfig::from_toml_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.simulator.executable, PathBuf::from("/opt/co2block/CO2BLOCK"));
        assert_eq!(config.simulator.timeout(), Some(Duration::from_secs(900)));
        assert_eq!(config.economics.capture_rate, 42.5);
        // Non-overridden values retain defaults
        assert_eq!(config.economics.transport_rate, 8.0);
        assert_eq!(config.tables.well_count_column, "number_of_wells");
    }

    #[test]
    fn test_validation_catches_unlisted_storage_table() {
        let mut config = PlannerConfig::default();
        config.outputs.storage_table = "missing.csv".to_string();
        let result = config.validate();
        assert!(result.is_err());
        if let Err(ConfigError::Validation(errors)) = result {
            assert!(errors.iter().any(|e| e.contains("storage_table")));
        }
    }

    #[test]
    fn test_validation_catches_negative_rate() {
        let mut config = PlannerConfig::default();
        config.economics.transport_rate = -1.0;
        config.economics.revenue_rates = vec![50.0, f64::NAN];
        let Err(ConfigError::Validation(errors)) = config.validate() else {
            panic!("negative and NaN rates must fail validation");
        };
        assert!(errors.iter().any(|e| e.contains("transport_rate")));
        assert!(errors.iter().any(|e| e.contains("revenue_rates[1]")));
    }

    #[test]
    fn test_validation_catches_report_collision() {
        let mut config = PlannerConfig::default();
        config.outputs.optimize_report = "V_M_max.csv".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_derived_paths() {
        let mut config = PlannerConfig::default();
        config.paths.workspace_dir = PathBuf::from("/srv/planner");
        assert_eq!(
            config.storage_table_path(),
            PathBuf::from("/srv/planner/outputs/V_M_max.csv")
        );
        assert_eq!(
            config.profile_path(),
            PathBuf::from("/srv/planner/reservoir_profile.csv")
        );
        assert_eq!(
            config.optimize_report_path(),
            PathBuf::from("/srv/planner/outputs/optimize.json")
        );
    }

    #[test]
    fn test_relative_paths_anchor_at_current_dir() {
        let cwd = std::env::current_dir().unwrap();
        let mut config = PlannerConfig::default();
        config.paths.workspace_dir = PathBuf::from("ws/a");
        let resolved = config.with_absolute_paths();

        assert_eq!(resolved.paths.workspace_dir, cwd.join("ws/a"));
        assert_eq!(resolved.simulator.executable, cwd.join("bin/CO2BLOCK"));
        assert_eq!(
            resolved.profile_path(),
            cwd.join("ws/a").join("reservoir_profile.csv")
        );
    }

    #[test]
    fn test_absolute_and_bare_paths_left_alone() {
        let mut config = PlannerConfig::default();
        config.paths.workspace_dir = PathBuf::from("/srv/planner");
        config.simulator.executable = PathBuf::from("CO2BLOCK");
        let resolved = config.with_absolute_paths();

        assert_eq!(resolved.paths.workspace_dir, PathBuf::from("/srv/planner"));
        assert_eq!(resolved.simulator.executable, PathBuf::from("CO2BLOCK"));
    }

    #[test]
    fn test_example_files_resolve_against_workspace() {
        let mut config = PlannerConfig::default();
        config.paths.workspace_dir = PathBuf::from("/srv/planner");
        assert_eq!(
            config.example_file_paths(),
            vec![
                PathBuf::from("/srv/planner/data/example_inputs.csv"),
                PathBuf::from("/srv/planner/data/example_V_M.csv"),
            ]
        );
    }

    #[test]
    fn test_roundtrip_toml() {
        let original = PlannerConfig::default();
        let toml_str = original.to_toml().expect("serialization should work");
        let roundtripped =
            PlannerConfig::from_toml_str(&toml_str).expect("deserialization should work");
        assert_eq!(original.outputs.artifacts, roundtripped.outputs.artifacts);
        assert_eq!(original.economics.revenue_rates, roundtripped.economics.revenue_rates);
    }

    #[test]
    fn test_load_from_file_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("planner_config.toml");
        std::fs::write(&path, "[simulator\nexecutable = 1").expect("write");
        match PlannerConfig::load_from_file(&path) {
            Err(ConfigError::Parse(p, _)) => assert_eq!(p, path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
