//! CO2BLOCK Planner: reservoir storage simulation and revenue optimization
//!
//! Drives the external CO2BLOCK simulator over a grid of well counts and well
//! distances, picks the best storage configuration from its output tables,
//! and turns storage volumes into net revenue curves.
//!
//! ## Architecture
//!
//! - **Profile**: normalizes reservoir parameters into the simulator's input table
//! - **Simulation**: launches CO2BLOCK and classifies how the run ended
//! - **Results**: reads storage and flow tables, finds maximum storage scenarios
//! - **Economics**: well configuration cost and net revenue per revenue rate
//! - **Session**: holds the active profile and uploaded table between steps

pub mod config;
pub mod economics;
pub mod error;
pub mod profile;
pub mod results;
pub mod session;
pub mod simulation;

// Re-export configuration
pub use config::PlannerConfig;

// Re-export errors
pub use error::{PlannerError, PlannerResult};

// Re-export the workflow
pub use session::PlannerSession;

pub use profile::{catalog::ReservoirCatalog, ProfileStore, ReservoirProfile};
pub use simulation::{LimitValue, RunLimits, RunOutcome, SimulationInvoker};
pub use results::{MaxScenario, ResultTable, WellStorage};
pub use economics::{
    CostModel, CostedWell, OptimizationReport, OptimizeRequest, RevenueSeries,
};
