//! Results Module - reads the simulator's output grids
//!
//! ## Tables
//!
//! CO2BLOCK writes a storage table and a flow table with the same layout:
//!
//! ```text
//! number_of_wells,V_M_max_d_500,V_M_max_d_1000,...
//! 1,0.42,0.57,...
//! 2,0.81,1.05,...
//! ```
//!
//! The distance of each column is the token at `tables.distance_token_index`
//! after splitting the label on `tables.distance_delimiter`.
//!
//! ## Operations
//!
//! - `locate_global_max()` - the best cell overall, with its flow rate
//! - `per_well_count_max()` - the best storage per well count, for costing

mod extract;
mod table;

pub use extract::{locate_global_max, per_well_count_max, MaxScenario, WellStorage};
pub use table::{distance_from_label, ResultTable, TableRow};
