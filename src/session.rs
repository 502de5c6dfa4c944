//! Planner Session
//!
//! Owns the state one user builds up across the planning workflow: the
//! active reservoir profile and the most recently uploaded storage table.
//! Every operation of the workflow is a method on the session, so no state
//! lives outside it.
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = PlannerSession::resume(PlannerConfig::load())?;
//! session.normalize(&raw_fields)?;
//! let outcome = session.invoke(&limits, &CancellationToken::new()).await?;
//! if outcome.is_success() {
//!     let scenario = session.max_scenario()?;
//!     let report = session.optimize(&request)?;
//! }
//! ```

use chrono::Utc;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::PlannerConfig;
use crate::economics::{
    build_revenue_series, CostModel, OptimizationReport, OptimizeRequest, ReportSource,
};
use crate::error::{PlannerError, PlannerResult};
use crate::profile::{normalize, ProfileStore, ReservoirProfile};
use crate::results::{locate_global_max, per_well_count_max, MaxScenario, ResultTable};
use crate::simulation::{
    clear_stale_artifacts, list_artifacts, RunLimits, RunLock, RunOutcome, SimulationInvoker,
};

pub struct PlannerSession {
    config: PlannerConfig,
    store: ProfileStore,
    invoker: SimulationInvoker,
    profile: Option<ReservoirProfile>,
    uploaded: Option<ResultTable>,
}

impl PlannerSession {
    /// Start an empty session. Nothing is read from the workspace.
    ///
    /// Relative workspace and simulator paths are anchored at the current
    /// directory first.
    pub fn new(config: PlannerConfig) -> Self {
        let config = config.with_absolute_paths();
        let store = ProfileStore::new(config.profile_path());
        let invoker = SimulationInvoker::from_config(&config.simulator)
            .with_working_dir(&config.paths.workspace_dir);
        Self {
            config,
            store,
            invoker,
            profile: None,
            uploaded: None,
        }
    }

    /// Start a session that picks up the profile stored in the workspace by
    /// an earlier session, if any.
    pub fn resume(config: PlannerConfig) -> PlannerResult<Self> {
        let mut session = Self::new(config);
        session.profile = session.store.read()?;
        if let Some(profile) = &session.profile {
            info!(name = %profile.name, path = %session.store.path().display(), "Resumed stored reservoir profile");
        }
        Ok(session)
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn profile(&self) -> Option<&ReservoirProfile> {
        self.profile.as_ref()
    }

    pub fn uploaded_table(&self) -> Option<&ResultTable> {
        self.uploaded.as_ref()
    }

    // ========================================================================
    // Profile
    // ========================================================================

    /// Normalize raw reservoir fields and make them the active profile.
    pub fn normalize(&mut self, raw: &Map<String, Value>) -> PlannerResult<&ReservoirProfile> {
        let profile = normalize(raw)?;
        self.submit_profile(profile)
    }

    /// Store an already normalized profile, replacing the previous one.
    pub fn submit_profile(
        &mut self,
        profile: ReservoirProfile,
    ) -> PlannerResult<&ReservoirProfile> {
        self.store.write(&profile)?;
        Ok(&*self.profile.insert(profile))
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    /// Run the simulator over the active profile.
    ///
    /// Fails only on preconditions (no profile, workspace locked, outputs
    /// directory not creatable). How the run itself ended is the returned
    /// `RunOutcome`.
    pub async fn invoke(
        &self,
        limits: &RunLimits,
        cancel: &CancellationToken,
    ) -> PlannerResult<RunOutcome> {
        if self.profile.is_none() {
            return Err(PlannerError::Configuration(
                "no reservoir profile has been saved; save inputs before running".to_string(),
            ));
        }

        let _lock = RunLock::acquire(&self.config.paths.workspace_dir)?;

        let outputs_dir = self.config.outputs_dir();
        fs::create_dir_all(&outputs_dir).map_err(|e| PlannerError::io(&outputs_dir, e))?;
        let removed = clear_stale_artifacts(&outputs_dir, &self.config.outputs.artifacts);
        if removed > 0 {
            info!(removed, "Cleared previous run outputs");
        }

        let outcome = self.invoker.invoke(self.store.path(), limits, cancel).await;
        info!(outcome = ?outcome, "Simulation run complete");
        Ok(outcome)
    }

    /// Artifacts of the last run that exist on disk.
    pub fn result_artifacts(&self) -> Vec<PathBuf> {
        list_artifacts(&self.config.outputs_dir(), &self.config.outputs.artifacts)
    }

    // ========================================================================
    // Results
    // ========================================================================

    /// Highest-storage configuration of the last run and its flow rate.
    pub fn max_scenario(&self) -> PlannerResult<MaxScenario> {
        let storage = self.read_output_table(&self.config.storage_table_path())?;
        let flow = self.read_output_table(&self.config.flow_table_path())?;
        locate_global_max(&storage, &flow, &self.config.tables)
    }

    /// Replace the uploaded storage table used by `optimize` without reuse.
    pub fn upload_table<R: std::io::Read>(&mut self, reader: R) -> PlannerResult<&ResultTable> {
        let table = ResultTable::from_reader(reader, &self.config.tables)?;
        info!(rows = table.row_count(), columns = table.column_count(), "Uploaded storage table");
        Ok(&*self.uploaded.insert(table))
    }

    fn read_output_table(&self, path: &Path) -> PlannerResult<ResultTable> {
        if !path.is_file() {
            return Err(PlannerError::NoSourceData(format!(
                "{} does not exist; run the simulator first",
                path.display()
            )));
        }
        ResultTable::from_path(path, &self.config.tables)
    }

    // ========================================================================
    // Optimization
    // ========================================================================

    /// Build the net revenue scenarios and write them as the optimize report.
    ///
    /// Any earlier report is removed first, so a failed optimization never
    /// leaves a stale report behind.
    pub fn optimize(&self, request: &OptimizeRequest) -> PlannerResult<OptimizationReport> {
        let report_path = self.config.optimize_report_path();
        remove_previous_report(&report_path);

        let (storage_profile, source) = if request.read_outputs {
            let table = self.read_output_table(&self.config.storage_table_path())?;
            (per_well_count_max(&table), ReportSource::SimulatorOutputs)
        } else {
            let table = self.uploaded.as_ref().ok_or_else(|| {
                PlannerError::NoSourceData(
                    "no table has been uploaded and reuse of simulator outputs was not requested"
                        .to_string(),
                )
            })?;
            (per_well_count_max(table), ReportSource::UploadedTable)
        };

        let profile = self.profile.as_ref().ok_or_else(|| {
            PlannerError::Configuration(
                "no reservoir profile has been saved; mean depth is required for costing"
                    .to_string(),
            )
        })?;

        let title = match source {
            ReportSource::SimulatorOutputs => profile.display_name(),
            ReportSource::UploadedTable => {
                crate::config::defaults::UNKNOWN_RESERVOIR_TITLE.to_string()
            }
        };

        let (capture_rate, transport_rate, revenue_rates) =
            request.rates.resolve(&self.config.economics);
        let model = CostModel::new(profile.mean_depth, capture_rate, transport_rate);
        let costed = model.cost_profile(&storage_profile);
        let series = build_revenue_series(&costed, &revenue_rates);

        let report = OptimizationReport {
            title,
            source,
            capture_rate,
            transport_rate,
            costed,
            series,
            generated_at: Utc::now(),
        };

        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent).map_err(|e| PlannerError::io(parent, e))?;
        }
        let json = serde_json::to_vec_pretty(&report)?;
        fs::write(&report_path, json).map_err(|e| PlannerError::io(&report_path, e))?;

        info!(
            path = %report_path.display(),
            title = %report.title,
            wells = report.costed.len(),
            scenarios = report.series.len(),
            "Wrote optimization report"
        );
        Ok(report)
    }

    /// The last optimization report on disk, `None` if none was written.
    pub fn optimization_result(&self) -> PlannerResult<Option<OptimizationReport>> {
        let path = self.config.optimize_report_path();
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PlannerError::io(&path, e)),
        }
    }
}

fn remove_previous_report(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => info!(path = %path.display(), "Removed previous optimization report"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Could not remove previous optimization report"),
    }
}
