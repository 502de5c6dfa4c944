//! Operating point extraction from storage and flow tables.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::table::ResultTable;
use crate::config::TableLayout;
use crate::error::{PlannerError, PlannerResult};

/// The single well count and distance with the highest storage volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxScenario {
    pub max_storage: f64,
    pub well_num: i64,
    pub well_distance: i64,
    /// Flow rate at the same grid position in the flow table.
    pub flow_rate: f64,
}

/// Best storage volume achievable with a given number of wells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellStorage {
    pub well_num: i64,
    pub max_storage: f64,
}

/// Find the global maximum storage cell and read the flow rate at the same
/// position.
///
/// Both tables must have the same shape and the same row and distance labels.
/// Cells are scanned row by row; on ties the first cell wins.
pub fn locate_global_max(
    storage: &ResultTable,
    flow: &ResultTable,
    layout: &TableLayout,
) -> PlannerResult<MaxScenario> {
    if storage.row_count() != flow.row_count() || storage.column_count() != flow.column_count() {
        return Err(PlannerError::table_shape(format!(
            "storage table is {}x{} but flow table is {}x{}",
            storage.row_count(),
            storage.column_count(),
            flow.row_count(),
            flow.column_count()
        )));
    }

    for (s, f) in storage.rows().iter().zip(flow.rows()) {
        if s.well_num != f.well_num {
            return Err(PlannerError::table_shape(format!(
                "row labels differ: storage has {} wells where flow has {}",
                s.well_num, f.well_num
            )));
        }
    }

    let distances = storage.distances(layout)?;
    let flow_distances = flow.distances(layout)?;
    if distances != flow_distances {
        return Err(PlannerError::table_shape(format!(
            "distance labels differ: storage {distances:?}, flow {flow_distances:?}"
        )));
    }

    let mut best: Option<(usize, usize, f64)> = None;
    for (r, row) in storage.rows().iter().enumerate() {
        for (c, cell) in row.cells.iter().enumerate() {
            if let Some(value) = *cell {
                if best.map_or(true, |(_, _, b)| value > b) {
                    best = Some((r, c, value));
                }
            }
        }
    }

    let (r, c, max_storage) = best.ok_or_else(|| {
        PlannerError::table_shape("storage table has no numeric cells".to_string())
    })?;
    let well_num = storage.rows()[r].well_num;
    let well_distance = distances[c];
    let flow_rate = flow.rows()[r].cells[c].ok_or_else(|| {
        PlannerError::table_shape(format!(
            "flow table has no value for {well_num} wells at distance {well_distance}"
        ))
    })?;

    debug!(max_storage, well_num, well_distance, flow_rate, "Located maximum storage scenario");
    Ok(MaxScenario {
        max_storage,
        well_num,
        well_distance,
        flow_rate,
    })
}

/// Maximum storage of every row, in source order.
///
/// Rows without values or whose maximum is zero are left out.
pub fn per_well_count_max(table: &ResultTable) -> Vec<WellStorage> {
    table
        .rows()
        .iter()
        .filter_map(|row| {
            let max_storage = row
                .cells
                .iter()
                .flatten()
                .copied()
                .reduce(f64::max)?;
            (max_storage != 0.0).then_some(WellStorage {
                well_num: row.well_num,
                max_storage,
            })
        })
        .collect()
}
