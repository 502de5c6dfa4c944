//! Reservoir Profile Module
//!
//! Normalizes a raw reservoir submission into the fixed column schema the
//! CO2BLOCK executable reads, and persists it as a single-row CSV table.
//!
//! ## Normalization Rules
//!
//! - Identity fields (`name`, `domainType`) pass through unchanged
//! - Missing, `null`, `false`, `0` and blank values become exactly `0.0`
//! - Numbers and numeric strings are coerced to `f64`
//! - Anything else is rejected with `PlannerError::InvalidInput` naming the field

pub mod catalog;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::defaults::UNKNOWN_RESERVOIR_TITLE;
use crate::error::{PlannerError, PlannerResult};

/// Numeric columns in the order the simulator expects them, after the two
/// identity columns.
pub const NUMERIC_FIELDS: [&str; 20] = [
    "minDepth",
    "meanDepth",
    "thickness",
    "area",
    "meanPermeability",
    "meanPorosity",
    "rockCompressibility",
    "waterCompressibility",
    "co2Density",
    "co2Viscosity",
    "waterViscosity",
    "porePressure",
    "meanPressure",
    "meanTemperature",
    "brineSalinity",
    "principalStress",
    "stressRatio",
    "frictionCoefficient",
    "cohesion",
    "tensileStrength",
];

/// Physical and geological parameters of one reservoir.
///
/// Field declaration order is the on-disk column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservoirProfile {
    pub name: String,
    pub domain_type: String,
    pub min_depth: f64,
    pub mean_depth: f64,
    pub thickness: f64,
    pub area: f64,
    pub mean_permeability: f64,
    pub mean_porosity: f64,
    pub rock_compressibility: f64,
    pub water_compressibility: f64,
    pub co2_density: f64,
    pub co2_viscosity: f64,
    pub water_viscosity: f64,
    pub pore_pressure: f64,
    pub mean_pressure: f64,
    pub mean_temperature: f64,
    pub brine_salinity: f64,
    pub principal_stress: f64,
    pub stress_ratio: f64,
    pub friction_coefficient: f64,
    pub cohesion: f64,
    pub tensile_strength: f64,
}

impl ReservoirProfile {
    fn from_columns(name: String, domain_type: String, values: [f64; 20]) -> Self {
        let [
            min_depth,
            mean_depth,
            thickness,
            area,
            mean_permeability,
            mean_porosity,
            rock_compressibility,
            water_compressibility,
            co2_density,
            co2_viscosity,
            water_viscosity,
            pore_pressure,
            mean_pressure,
            mean_temperature,
            brine_salinity,
            principal_stress,
            stress_ratio,
            friction_coefficient,
            cohesion,
            tensile_strength,
        ] = values;
        Self {
            name,
            domain_type,
            min_depth,
            mean_depth,
            thickness,
            area,
            mean_permeability,
            mean_porosity,
            rock_compressibility,
            water_compressibility,
            co2_density,
            co2_viscosity,
            water_viscosity,
            pore_pressure,
            mean_pressure,
            mean_temperature,
            brine_salinity,
            principal_stress,
            stress_ratio,
            friction_coefficient,
            cohesion,
            tensile_strength,
        }
    }

    /// Numeric columns paired with their names, in schema order.
    pub fn numeric_values(&self) -> [(&'static str, f64); 20] {
        let values = [
            self.min_depth,
            self.mean_depth,
            self.thickness,
            self.area,
            self.mean_permeability,
            self.mean_porosity,
            self.rock_compressibility,
            self.water_compressibility,
            self.co2_density,
            self.co2_viscosity,
            self.water_viscosity,
            self.pore_pressure,
            self.mean_pressure,
            self.mean_temperature,
            self.brine_salinity,
            self.principal_stress,
            self.stress_ratio,
            self.friction_coefficient,
            self.cohesion,
            self.tensile_strength,
        ];
        std::array::from_fn(|i| (NUMERIC_FIELDS[i], values[i]))
    }

    /// Name to show on reports; blank or `nan` names become "Unknown".
    pub fn display_name(&self) -> String {
        let name = self.name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("nan") {
            UNKNOWN_RESERVOIR_TITLE.to_string()
        } else {
            name.to_string()
        }
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Project a raw field map onto the fixed profile schema.
///
/// Unknown keys are ignored. The first field that cannot be coerced aborts
/// normalization.
pub fn normalize(raw: &Map<String, Value>) -> PlannerResult<ReservoirProfile> {
    let name = identity_text(raw.get("name"));
    let domain_type = identity_text(raw.get("domainType"));

    let mut values = [0.0_f64; 20];
    for (slot, field) in values.iter_mut().zip(NUMERIC_FIELDS) {
        *slot = coerce_numeric(field, raw.get(field))?;
    }

    debug!(name = %name, domain_type = %domain_type, "Normalized reservoir profile");
    Ok(ReservoirProfile::from_columns(name, domain_type, values))
}

fn identity_text(raw: Option<&Value>) -> String {
    match raw {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn coerce_numeric(field: &str, raw: Option<&Value>) -> PlannerResult<f64> {
    let invalid = |message: String| PlannerError::InvalidInput {
        field: field.to_string(),
        message,
    };

    match raw {
        None | Some(Value::Null | Value::Bool(false)) => Ok(0.0),
        Some(Value::Bool(true)) => Ok(1.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| invalid(format!("{n} is not representable as a float"))),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(0.0);
            }
            trimmed
                .parse::<f64>()
                .map_err(|e| invalid(format!("'{s}' is not a number ({e})")))
        }
        Some(other) => Err(invalid(format!("expected a number, got {other}"))),
    }
}

// ============================================================================
// Profile Store
// ============================================================================

/// Single-slot store for the active reservoir profile.
///
/// Every write fully replaces the previous profile; no history is kept.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the profile as a header row plus one data row.
    ///
    /// Written to a sibling temp file and renamed into place, so a reader
    /// never sees a half-written profile.
    pub fn write(&self, profile: &ReservoirProfile) -> PlannerResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PlannerError::io(parent, e))?;
        }

        let tmp_path = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp_path)?;
            writer.serialize(profile)?;
            writer.flush().map_err(|e| PlannerError::io(&tmp_path, e))?;
        }
        fs::rename(&tmp_path, &self.path).map_err(|e| PlannerError::io(&self.path, e))?;

        info!(path = %self.path.display(), name = %profile.name, "Stored reservoir profile");
        Ok(())
    }

    /// Read back the stored profile, `None` when nothing has been stored yet.
    pub fn read(&self) -> PlannerResult<Option<ReservoirProfile>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        match reader.deserialize::<ReservoirProfile>().next() {
            Some(record) => Ok(Some(record?)),
            None => Err(PlannerError::Configuration(format!(
                "stored profile {} has no data row",
                self.path.display()
            ))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("test payload must be an object")
    }

    #[test]
    fn test_missing_and_empty_fields_become_zero() {
        let profile = normalize(&raw(json!({
            "name": "Bunter",
            "domainType": "aquifer",
            "meanDepth": "",
            "thickness": null,
            "area": false,
            "meanPorosity": "   ",
        })))
        .unwrap();

        for (field, value) in profile.numeric_values() {
            assert_eq!(value.to_bits(), 0.0_f64.to_bits(), "{field} should be exactly 0.0");
        }
    }

    #[test]
    fn test_numeric_strings_and_numbers_coerce() {
        let profile = normalize(&raw(json!({
            "meanDepth": "2000",
            "thickness": 120,
            "meanPermeability": " 1.5e2 ",
            "co2Density": 0.65,
            "stressRatio": true,
        })))
        .unwrap();

        assert_eq!(profile.mean_depth, 2000.0);
        assert_eq!(profile.thickness, 120.0);
        assert_eq!(profile.mean_permeability, 150.0);
        assert_eq!(profile.co2_density, 0.65);
        assert_eq!(profile.stress_ratio, 1.0);
    }

    #[test]
    fn test_identity_fields_pass_through() {
        let profile = normalize(&raw(json!({
            "name": "  Hamilton  ",
            "domainType": "depleted gas field",
        })))
        .unwrap();
        assert_eq!(profile.name, "  Hamilton  ");
        assert_eq!(profile.domain_type, "depleted gas field");

        let unnamed = normalize(&Map::new()).unwrap();
        assert_eq!(unnamed.name, "");
        assert_eq!(unnamed.domain_type, "");
    }

    #[test]
    fn test_unparseable_field_is_named() {
        let err = normalize(&raw(json!({ "meanDepth": 100, "porePressure": "high" })))
            .unwrap_err();
        match err {
            PlannerError::InvalidInput { field, .. } => assert_eq!(field, "porePressure"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }

        let err = normalize(&raw(json!({ "cohesion": [1, 2] }))).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidInput { ref field, .. } if field == "cohesion"));
    }

    #[test]
    fn test_display_name_falls_back_to_unknown() {
        let mut profile = normalize(&Map::new()).unwrap();
        assert_eq!(profile.display_name(), "Unknown");
        profile.name = "NaN".to_string();
        assert_eq!(profile.display_name(), "Unknown");
        profile.name = "Captain".to_string();
        assert_eq!(profile.display_name(), "Captain");
    }

    #[test]
    fn test_store_roundtrip_and_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ProfileStore::new(dir.path().join("nested").join("profile.csv"));
        assert!(store.read().unwrap().is_none());

        let first = normalize(&raw(json!({ "name": "First", "meanDepth": 1500 }))).unwrap();
        store.write(&first).unwrap();
        let second = normalize(&raw(json!({ "name": "Second", "meanDepth": "2500.5" }))).unwrap();
        store.write(&second).unwrap();

        let stored = store.read().unwrap().expect("profile stored");
        assert_eq!(stored, second);

        let contents = fs::read_to_string(store.path()).unwrap();
        assert_eq!(contents.lines().count(), 2, "header plus exactly one row");
        assert!(contents.starts_with("name,domainType,minDepth,meanDepth,thickness"));
    }
}
