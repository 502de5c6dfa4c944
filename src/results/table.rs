//! Result table parsing.
//!
//! A result table is a CSV grid: the first column holds the well count of
//! each row, every other column holds one candidate well distance. Empty and
//! `nan` cells are kept as `None` rather than rejected.

use serde::Serialize;
use std::path::Path;

use crate::config::TableLayout;
use crate::error::{PlannerError, PlannerResult};

/// One data row: the well count label and its cells, one per distance column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub well_num: i64,
    pub cells: Vec<Option<f64>>,
}

/// Parsed storage or flow table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultTable {
    label_header: String,
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl ResultTable {
    pub fn from_path(path: &Path, layout: &TableLayout) -> PlannerResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| PlannerError::io(path, e))?;
        Self::from_reader(file, layout).map_err(|e| match e {
            PlannerError::TableShape(msg) => {
                PlannerError::TableShape(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Parse a table, checking the label column header, row widths, cells
    /// and row labels.
    pub fn from_reader<R: std::io::Read>(reader: R, layout: &TableLayout) -> PlannerResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let label_header = headers.get(0).map(str::trim).unwrap_or_default().to_string();
        if label_header != layout.well_count_column {
            return Err(PlannerError::table_shape(format!(
                "first column must be '{}', found '{}'",
                layout.well_count_column, label_header
            )));
        }
        let columns: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();

        let mut rows = Vec::new();
        for (index, record) in csv_reader.records().enumerate() {
            let record = record?;
            let line = index + 2;
            if record.len() != headers.len() {
                return Err(PlannerError::table_shape(format!(
                    "line {line} has {} fields, header has {}",
                    record.len(),
                    headers.len()
                )));
            }

            let label = record.get(0).unwrap_or_default();
            let well_num = parse_integral(label).ok_or_else(|| {
                PlannerError::table_shape(format!("line {line}: '{label}' is not a well count"))
            })?;

            let cells = record
                .iter()
                .skip(1)
                .zip(&columns)
                .map(|(cell, column)| {
                    parse_cell(cell).map_err(|()| {
                        PlannerError::table_shape(format!(
                            "line {line}, column '{column}': '{cell}' is not a number"
                        ))
                    })
                })
                .collect::<PlannerResult<Vec<_>>>()?;

            rows.push(TableRow { well_num, cells });
        }

        Ok(Self {
            label_header,
            columns,
            rows,
        })
    }

    pub fn label_header(&self) -> &str {
        &self.label_header
    }

    /// Distance column labels, without the well count column.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distance encoded in each column label, in column order.
    pub fn distances(&self, layout: &TableLayout) -> PlannerResult<Vec<i64>> {
        self.columns
            .iter()
            .map(|column| distance_from_label(column, layout))
            .collect()
    }
}

/// Extract the distance token from a column label such as `V_M_max_d_1000`.
pub fn distance_from_label(column: &str, layout: &TableLayout) -> PlannerResult<i64> {
    let token = column
        .split(layout.distance_delimiter.as_str())
        .nth(layout.distance_token_index)
        .ok_or_else(|| {
            PlannerError::table_shape(format!(
                "column '{column}' has no token {} when split on '{}'",
                layout.distance_token_index, layout.distance_delimiter
            ))
        })?;
    parse_integral(token).ok_or_else(|| {
        PlannerError::table_shape(format!("column '{column}': '{token}' is not a distance"))
    })
}

/// Integer labels, also accepting integral floats such as `8.0`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub(crate) fn parse_integral(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(v) = text.parse::<i64>() {
        return Some(v);
    }
    let v = text.parse::<f64>().ok()?;
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}

fn parse_cell(cell: &str) -> Result<Option<f64>, ()> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    trimmed.parse::<f64>().map(Some).map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> TableLayout {
        TableLayout::default()
    }

    #[test]
    fn test_parses_labels_and_null_cells() {
        let csv = "number_of_wells,V_M_max_d_100,V_M_max_d_200\n5,1.2,\n8.0,nan,2.4\n";
        let table = ResultTable::from_reader(csv.as_bytes(), &layout()).unwrap();

        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0].well_num, 5);
        assert_eq!(table.rows()[0].cells, vec![Some(1.2), None]);
        assert_eq!(table.rows()[1].well_num, 8);
        assert_eq!(table.rows()[1].cells, vec![None, Some(2.4)]);
        assert_eq!(table.distances(&layout()).unwrap(), vec![100, 200]);
    }

    #[test]
    fn test_wrong_label_header_rejected() {
        let csv = "wells,V_M_max_d_100\n5,1.0\n";
        let err = ResultTable::from_reader(csv.as_bytes(), &layout()).unwrap_err();
        assert!(matches!(err, PlannerError::TableShape(_)), "got {err:?}");
    }

    #[test]
    fn test_ragged_row_rejected() {
        let csv = "number_of_wells,V_M_max_d_100,V_M_max_d_200\n5,1.0\n";
        let err = ResultTable::from_reader(csv.as_bytes(), &layout()).unwrap_err();
        assert!(matches!(err, PlannerError::TableShape(ref m) if m.contains("line 2")));
    }

    #[test]
    fn test_bad_cell_and_label_rejected() {
        let csv = "number_of_wells,V_M_max_d_100\n5,lots\n";
        assert!(matches!(
            ResultTable::from_reader(csv.as_bytes(), &layout()),
            Err(PlannerError::TableShape(_))
        ));

        let csv = "number_of_wells,V_M_max_d_100\n5.5,1.0\n";
        assert!(matches!(
            ResultTable::from_reader(csv.as_bytes(), &layout()),
            Err(PlannerError::TableShape(_))
        ));
    }

    #[test]
    fn test_distance_token_must_exist() {
        assert_eq!(distance_from_label("Q_M_max_d_1500", &layout()).unwrap(), 1500);
        assert_eq!(distance_from_label("V_M_max_d_250.0", &layout()).unwrap(), 250);
        assert!(distance_from_label("V_M_max", &layout()).is_err());

        let custom = TableLayout {
            distance_delimiter: "-".to_string(),
            distance_token_index: 1,
            ..TableLayout::default()
        };
        assert_eq!(distance_from_label("d-300", &custom).unwrap(), 300);
    }
}
