//! Reservoir catalog - known reservoirs offered for selection.
//!
//! The catalog is a CSV table whose headers use the profile field names
//! (`name`, `domainType`, `meanDepth`, ...). Records are kept raw so that a
//! selected reservoir goes through the same normalizer as a hand-entered one.

use serde_json::{Map, Number, Value};
use std::path::Path;
use tracing::info;

use super::{normalize, ReservoirProfile};
use crate::error::{PlannerError, PlannerResult};

#[derive(Debug, Clone, Default)]
pub struct ReservoirCatalog {
    records: Vec<Map<String, Value>>,
}

impl ReservoirCatalog {
    pub fn load(path: &Path) -> PlannerResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| PlannerError::io(path, e))?;
        let catalog = Self::from_reader(file)?;
        info!(path = %path.display(), count = catalog.len(), "Loaded reservoir catalog");
        Ok(catalog)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> PlannerResult<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let mut records = Vec::new();
        for row in csv_reader.records() {
            let row = row?;
            let record: Map<String, Value> = headers
                .iter()
                .zip(row.iter())
                .map(|(header, cell)| (header.trim().to_string(), cell_value(header, cell)))
                .collect();
            records.push(record);
        }
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Raw records, in file order.
    pub fn records(&self) -> &[Map<String, Value>] {
        &self.records
    }

    /// Look up a reservoir by its `name` column (surrounding whitespace ignored).
    pub fn find(&self, name: &str) -> Option<&Map<String, Value>> {
        let wanted = name.trim();
        self.records.iter().find(|record| {
            record
                .get("name")
                .and_then(Value::as_str)
                .is_some_and(|n| n.trim() == wanted)
        })
    }

    /// Normalize the named reservoir into a profile.
    pub fn profile(&self, name: &str) -> PlannerResult<ReservoirProfile> {
        let record = self.find(name).ok_or_else(|| PlannerError::InvalidInput {
            field: "name".to_string(),
            message: format!("reservoir '{name}' not found in catalog"),
        })?;
        normalize(record)
    }
}

/// Identity columns stay text; other cells become numbers when they parse.
fn cell_value(header: &str, cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if matches!(header.trim(), "name" | "domainType") {
        return Value::String(cell.to_string());
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or_else(|| Value::String(cell.to_string()), Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = "\
name,domainType,minDepth,meanDepth,meanPorosity
Bunter Closure 36,aquifer,1000,1400.5,0.22
Hamilton,depleted gas field,700,,0.28
";

    #[test]
    fn test_catalog_parses_records() {
        let catalog = ReservoirCatalog::from_reader(CATALOG.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);
        let bunter = catalog.find("Bunter Closure 36").unwrap();
        assert_eq!(bunter["meanDepth"], Value::from(1400.5));
        assert_eq!(bunter["domainType"], Value::from("aquifer"));
        assert_eq!(catalog.find("Hamilton").unwrap()["meanDepth"], Value::Null);
        assert!(catalog.find("Endurance").is_none());
    }

    #[test]
    fn test_catalog_profile_goes_through_normalizer() {
        let catalog = ReservoirCatalog::from_reader(CATALOG.as_bytes()).unwrap();
        let profile = catalog.profile(" Hamilton ").unwrap();
        assert_eq!(profile.name, "Hamilton");
        assert_eq!(profile.mean_depth, 0.0);
        assert_eq!(profile.min_depth, 700.0);

        assert!(matches!(
            catalog.profile("Endurance"),
            Err(PlannerError::InvalidInput { .. })
        ));
    }
}
