//! Planner Configuration Module
//!
//! Loads the planner configuration from TOML: simulator location, file
//! names, table label conventions and default economic rates.
//!
//! ## Loading Order
//!
//! 1. `CO2BLOCK_CONFIG` environment variable (path to TOML file)
//! 2. `planner_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The loaded config is handed to `PlannerSession::new` and travels with the
//! session; there is no process-wide config slot.

mod planner_config;
pub mod defaults;
pub mod validation;

pub use planner_config::*;
