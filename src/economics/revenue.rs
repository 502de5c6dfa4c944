//! Net revenue scenarios over a costed storage profile.

use serde::{Deserialize, Serialize};

use super::cost::CostedWell;

/// Scale of the reported net revenue (units of 100 000).
const REVENUE_SCALE: f64 = 100_000.0;
const TONNES_PER_MEGATONNE: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePoint {
    pub well_num: i64,
    pub net_revenue: f64,
}

/// Net revenue curve for one unit revenue rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSeries {
    /// Revenue per tonne of stored CO2.
    pub rate: f64,
    /// One point per costed entry, same order.
    pub points: Vec<RevenuePoint>,
    /// Well counts where the curve crosses or touches zero.
    pub breakeven_well_counts: Vec<f64>,
}

pub fn net_revenue(entry: &CostedWell, rate: f64) -> f64 {
    (entry.max_storage * rate * TONNES_PER_MEGATONNE - entry.cost) / REVENUE_SCALE
}

/// One series per rate, in the order the rates were given.
pub fn build_revenue_series(costed: &[CostedWell], rates: &[f64]) -> Vec<RevenueSeries> {
    rates
        .iter()
        .map(|&rate| {
            let points: Vec<RevenuePoint> = costed
                .iter()
                .map(|entry| RevenuePoint {
                    well_num: entry.well_num,
                    net_revenue: net_revenue(entry, rate),
                })
                .collect();
            let breakeven_well_counts = breakeven_crossings(&points);
            RevenueSeries {
                rate,
                points,
                breakeven_well_counts,
            }
        })
        .collect()
}

/// Linearly interpolated well counts where net revenue changes sign between
/// neighbouring points, plus points that sit exactly on zero.
fn breakeven_crossings(points: &[RevenuePoint]) -> Vec<f64> {
    let mut crossings = Vec::new();
    for (i, p) in points.iter().enumerate() {
        if p.net_revenue == 0.0 {
            crossings.push(p.well_num as f64);
        }
        let Some(next) = points.get(i + 1) else {
            continue;
        };
        if p.net_revenue * next.net_revenue < 0.0 {
            let (x0, x1) = (p.well_num as f64, next.well_num as f64);
            let t = p.net_revenue / (p.net_revenue - next.net_revenue);
            crossings.push(x0 + t * (x1 - x0));
        }
    }
    crossings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn costed(well_num: i64, max_storage: f64, cost: f64) -> CostedWell {
        CostedWell {
            well_num,
            max_storage,
            cost,
        }
    }

    #[test]
    fn test_net_revenue_formula() {
        // (2.0 * 60 * 1e6 - 100e6) / 1e5 = 200
        let entry = costed(4, 2.0, 100_000_000.0);
        assert_eq!(net_revenue(&entry, 60.0), 200.0);
    }

    #[test]
    fn test_one_series_per_rate_aligned_with_profile() {
        let profile = [costed(3, 1.0, 50e6), costed(7, 2.0, 90e6)];
        let series = build_revenue_series(&profile, &[40.0, 80.0, 60.0]);

        assert_eq!(series.len(), 3);
        assert_eq!(series[1].rate, 80.0);
        for s in &series {
            assert_eq!(s.points.len(), profile.len());
            assert_eq!(s.points[0].well_num, 3);
            assert_eq!(s.points[1].well_num, 7);
        }
        assert_eq!(series[0].points[0].net_revenue, -100.0);
        assert_eq!(series[1].points[1].net_revenue, 700.0);
    }

    #[test]
    fn test_empty_inputs_give_empty_output() {
        assert!(build_revenue_series(&[], &[]).is_empty());
        let series = build_revenue_series(&[], &[50.0]);
        assert_eq!(series.len(), 1);
        assert!(series[0].points.is_empty());
        assert!(series[0].breakeven_well_counts.is_empty());
    }

    #[test]
    fn test_breakeven_interpolates_sign_change() {
        let points = [
            RevenuePoint { well_num: 2, net_revenue: -10.0 },
            RevenuePoint { well_num: 4, net_revenue: 30.0 },
            RevenuePoint { well_num: 6, net_revenue: 0.0 },
            RevenuePoint { well_num: 8, net_revenue: -5.0 },
        ];
        assert_eq!(breakeven_crossings(&points), vec![2.5, 6.0]);
    }
}
