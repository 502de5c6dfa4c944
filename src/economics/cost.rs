//! Well configuration cost model.
//!
//! Cost of storing CO2 with a given number of wells: drilling, per-well fixed
//! and surface costs, site and monitoring costs with a 5% contingency, plus
//! capture and transport of the stored volume.

use serde::{Deserialize, Serialize};

use crate::results::WellStorage;

/// Drilling cost per metre of mean reservoir depth.
const DRILLING_COST_PER_METRE: f64 = 26.0;
const FIXED_COST_PER_WELL: f64 = 8200.0;
const SURFACE_COST_PER_WELL: f64 = 6120.0;
const SITE_COST: f64 = 24097.0;
const MONITORING_COST: f64 = 1530.0;
const CONTINGENCY_FACTOR: f64 = 1.05;
/// Storage volumes are in megatonnes; rates are per tonne.
const TONNES_PER_MEGATONNE: f64 = 1_000_000.0;

/// One well count with its storage volume and total cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostedWell {
    pub well_num: i64,
    pub max_storage: f64,
    pub cost: f64,
}

/// Cost parameters for one reservoir.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    pub mean_depth: f64,
    pub capture_rate: f64,
    pub transport_rate: f64,
}

impl CostModel {
    pub fn new(mean_depth: f64, capture_rate: f64, transport_rate: f64) -> Self {
        Self {
            mean_depth,
            capture_rate,
            transport_rate,
        }
    }

    /// Total cost of operating `well_num` wells that store `max_storage`.
    ///
    /// Terms are summed in a fixed order so results are reproducible to the bit.
    pub fn well_configuration_cost(&self, well_num: i64, max_storage: f64) -> f64 {
        let wells = well_num as f64;
        let drilling = self.mean_depth * DRILLING_COST_PER_METRE;
        let fixed = FIXED_COST_PER_WELL * wells;
        let surface = SURFACE_COST_PER_WELL * wells;
        let storage_cost =
            (drilling + fixed + surface + SITE_COST + MONITORING_COST) * CONTINGENCY_FACTOR;
        let capture_cost = max_storage * self.capture_rate * TONNES_PER_MEGATONNE;
        let transport_cost = max_storage * self.transport_rate * TONNES_PER_MEGATONNE;
        storage_cost + capture_cost + transport_cost
    }

    /// Attach a cost to every entry of a storage profile, keeping its order.
    pub fn cost_profile(&self, profile: &[WellStorage]) -> Vec<CostedWell> {
        profile
            .iter()
            .map(|entry| CostedWell {
                well_num: entry.well_num,
                max_storage: entry.max_storage,
                cost: self.well_configuration_cost(entry.well_num, entry.max_storage),
            })
            .collect()
    }
}
