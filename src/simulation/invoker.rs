//! CO2BLOCK subprocess launcher.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{RunLimits, RunOutcome};
use crate::config::SimulatorConfig;

/// Positional arguments in the order the executable reads them:
/// `profileDir profileFile correction distMin distMax nrDist nrWellMax wellRadius timeYr maxQ`.
pub fn build_args(profile_path: &Path, limits: &RunLimits) -> Vec<OsString> {
    let profile_dir = profile_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let profile_file = profile_path.file_name().unwrap_or_default();

    let mut args = vec![profile_dir.as_os_str().to_os_string(), profile_file.to_os_string()];
    args.extend(
        [
            &limits.correction,
            &limits.min_distance,
            &limits.max_distance,
            &limits.num_distance,
            &limits.max_well_num,
            &limits.well_radius,
            &limits.injection_time,
            &limits.max_q,
        ]
        .into_iter()
        .map(|value| OsString::from(value.to_string())),
    );
    args
}

enum Waited {
    Exited(std::io::Result<Output>),
    TimedOut(Duration),
}

/// Launches the simulator and classifies how it ended.
#[derive(Debug, Clone)]
pub struct SimulationInvoker {
    executable: PathBuf,
    timeout: Option<Duration>,
    working_dir: Option<PathBuf>,
}

impl SimulationInvoker {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            timeout: None,
            working_dir: None,
        }
    }

    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self::new(&config.executable).with_timeout(config.timeout())
    }

    /// Set a wall-clock deadline; `None` waits for as long as the run takes.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Directory the executable runs in; defaults to the planner's own.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Run the simulator to completion, deadline or cancellation.
    ///
    /// Never returns an error: every way the run can end is a `RunOutcome`.
    /// On timeout or cancellation the child is killed when its handle drops.
    pub async fn invoke(
        &self,
        profile_path: &Path,
        limits: &RunLimits,
        cancel: &CancellationToken,
    ) -> RunOutcome {
        let args = build_args(profile_path, limits);
        info!(executable = %self.executable.display(), args = ?args, "Launching CO2BLOCK");

        let mut command = Command::new(&self.executable);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(executable = %self.executable.display(), error = %e, "Failed to start CO2BLOCK");
                return RunOutcome::LaunchError {
                    cause: e.to_string(),
                };
            }
        };

        let start = Instant::now();
        let timeout = self.timeout;
        let wait = async move {
            match timeout {
                Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                    Ok(result) => Waited::Exited(result),
                    Err(_) => Waited::TimedOut(limit),
                },
                None => Waited::Exited(child.wait_with_output().await),
            }
        };

        let waited = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                warn!("CO2BLOCK run cancelled, terminating");
                return RunOutcome::Cancelled;
            }
            waited = wait => waited,
        };

        let elapsed_ms = start.elapsed().as_millis();
        match waited {
            Waited::TimedOut(limit) => {
                warn!(seconds = limit.as_secs(), "CO2BLOCK exceeded its deadline, terminating");
                RunOutcome::Timeout {
                    seconds: limit.as_secs(),
                }
            }
            Waited::Exited(Err(e)) => {
                warn!(error = %e, "Lost contact with CO2BLOCK process");
                RunOutcome::LaunchError {
                    cause: e.to_string(),
                }
            }
            Waited::Exited(Ok(output)) => {
                let exit_code = output.status.code().unwrap_or(-1);
                if exit_code == 0 {
                    debug!(stdout = %String::from_utf8_lossy(&output.stdout), "CO2BLOCK stdout");
                    info!(elapsed_ms, "CO2BLOCK finished");
                    RunOutcome::Success
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                    warn!(exit_code, elapsed_ms, stderr = %stderr, "CO2BLOCK failed");
                    RunOutcome::ExecutionError { exit_code, stderr }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::LimitValue;

    fn limits() -> RunLimits {
        RunLimits {
            correction: LimitValue::from("off"),
            injection_time: LimitValue::from(30_i64),
            min_distance: LimitValue::from(0.5_f64),
            max_distance: LimitValue::from(10_i64),
            num_distance: LimitValue::from(4_i64),
            max_well_num: LimitValue::from(25_i64),
            well_radius: LimitValue::from(0.1_f64),
            max_q: LimitValue::from(1.5_f64),
        }
    }

    #[test]
    fn test_args_follow_positional_contract() {
        let args = build_args(Path::new("/work/session/reservoir_profile.csv"), &limits());
        let args: Vec<String> = args
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect();
        assert_eq!(
            args,
            vec![
                "/work/session",
                "reservoir_profile.csv",
                "off",
                "0.5",
                "10",
                "4",
                "25",
                "0.1",
                "30",
                "1.5",
            ]
        );
    }

    #[test]
    fn test_bare_profile_name_runs_in_current_dir() {
        let args = build_args(Path::new("profile.csv"), &limits());
        assert_eq!(args[0], OsString::from("."));
        assert_eq!(args[1], OsString::from("profile.csv"));
    }

    #[tokio::test]
    async fn test_missing_executable_is_launch_error() {
        let invoker = SimulationInvoker::new("/nonexistent/path/to/CO2BLOCK");
        let outcome = invoker
            .invoke(Path::new("profile.csv"), &limits(), &CancellationToken::new())
            .await;
        assert!(matches!(outcome, RunOutcome::LaunchError { .. }), "got {outcome:?}");
    }
}
