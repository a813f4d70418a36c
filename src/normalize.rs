//! Schema normalization: maps source columns onto canonical trip fields.
//!
//! Each canonical field declares the kind of value it expects and is filled
//! through [`coerce`], which never fails: a cell that does not parse becomes
//! [`CellValue::Missing`] and is counted as a coercion warning.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDateTime;
use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::config::FieldMapping;
use crate::error::{PipelineError, Result};
use crate::loader::{RawTable, cell};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CanonicalField {
    StartTimestamp,
    EndTimestamp,
    Category,
    Origin,
    Destination,
    Distance,
    Purpose,
}

impl CanonicalField {
    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::StartTimestamp => "start_timestamp",
            CanonicalField::EndTimestamp => "end_timestamp",
            CanonicalField::Category => "category",
            CanonicalField::Origin => "origin",
            CanonicalField::Destination => "destination",
            CanonicalField::Distance => "distance",
            CanonicalField::Purpose => "purpose",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            CanonicalField::StartTimestamp | CanonicalField::EndTimestamp => FieldKind::Timestamp,
            CanonicalField::Distance => FieldKind::Decimal,
            _ => FieldKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Timestamp,
    Decimal,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Timestamp(NaiveDateTime),
    Decimal(f64),
    Text(String),
    Missing,
}

/// Outcome of coercing one (possibly combined) source cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    Value(CellValue),
    /// The source was missing to begin with.
    Absent,
    /// The source held text that did not parse as the expected kind.
    Rejected,
}

/// Coerces raw text into the value kind a canonical field expects.
pub fn coerce(kind: FieldKind, raw: Option<&str>, timestamp_formats: &[String]) -> Coerced {
    let Some(raw) = raw else {
        return Coerced::Absent;
    };
    match kind {
        FieldKind::Text => Coerced::Value(CellValue::Text(raw.to_string())),
        FieldKind::Decimal => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Coerced::Value(CellValue::Decimal(v)),
            _ => Coerced::Rejected,
        },
        FieldKind::Timestamp => timestamp_formats
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
            .map(|ts| Coerced::Value(CellValue::Timestamp(ts)))
            .unwrap_or(Coerced::Rejected),
    }
}

/// One input row expressed in canonical fields. `source` keeps the original
/// record so the cleaned export can carry every source column.
#[derive(Debug, Clone)]
pub struct Trip {
    pub source: StringRecord,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub category: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub distance: Option<f64>,
    pub purpose: String,
}

/// Per-field counts of cells that held text but failed to coerce.
#[derive(Debug, Default, Clone)]
pub struct NormalizeReport {
    pub rows: usize,
    pub coercion_warnings: BTreeMap<CanonicalField, usize>,
    pub purpose_filled: usize,
}

impl NormalizeReport {
    pub fn warnings_for(&self, field: CanonicalField) -> usize {
        self.coercion_warnings.get(&field).copied().unwrap_or(0)
    }
}

/// Column positions resolved once against the header row.
struct ResolvedMapping {
    start: Vec<usize>,
    end: Option<Vec<usize>>,
    category: usize,
    origin: usize,
    destination: usize,
    distance: usize,
    purpose: usize,
}

impl ResolvedMapping {
    fn resolve(table: &RawTable, mapping: &FieldMapping, path: &Path) -> Result<Self> {
        let index = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| PipelineError::MissingColumn {
                    path: path.to_path_buf(),
                    column: name.to_string(),
                })
        };
        let indices = |names: &[String]| names.iter().map(|n| index(n)).collect::<Result<Vec<_>>>();

        Ok(Self {
            start: indices(&mapping.start_columns)?,
            end: mapping.end_columns.as_deref().map(indices).transpose()?,
            category: index(&mapping.category)?,
            origin: index(&mapping.origin)?,
            destination: index(&mapping.destination)?,
            distance: index(&mapping.distance)?,
            purpose: index(&mapping.purpose)?,
        })
    }
}

/// Joins the parts of a multi-column timestamp with single spaces. Any
/// missing part makes the whole value missing.
fn joined(record: &StringRecord, columns: &[usize]) -> Option<String> {
    let parts = columns
        .iter()
        .map(|&i| cell(record, i))
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join(" "))
}

/// Maps every row of `table` onto canonical fields.
///
/// Fails only when a mapped column is absent from the header; individual
/// cells never fail.
#[tracing::instrument(skip_all, fields(rows = table.len()))]
pub fn normalize(
    table: &RawTable,
    mapping: &FieldMapping,
    timestamp_formats: &[String],
    path: &Path,
) -> Result<(Vec<Trip>, NormalizeReport)> {
    let columns = ResolvedMapping::resolve(table, mapping, path)?;
    let mut report = NormalizeReport {
        rows: table.len(),
        ..Default::default()
    };

    let mut trips = Vec::with_capacity(table.len());
    for (row, record) in table.records.iter().enumerate() {
        let mut field = |field: CanonicalField, raw: Option<String>| -> CellValue {
            match coerce(field.kind(), raw.as_deref(), timestamp_formats) {
                Coerced::Value(value) => value,
                Coerced::Absent => CellValue::Missing,
                Coerced::Rejected => {
                    debug!(row, field = field.name(), raw = ?raw, "Cell failed to coerce");
                    *report.coercion_warnings.entry(field).or_default() += 1;
                    CellValue::Missing
                }
            }
        };
        let text = |i: usize| cell(record, i).map(str::to_string);

        let start = as_timestamp(field(
            CanonicalField::StartTimestamp,
            joined(record, &columns.start),
        ));
        let end = match &columns.end {
            Some(end_columns) => as_timestamp(field(
                CanonicalField::EndTimestamp,
                joined(record, end_columns),
            )),
            None => start,
        };
        let category = as_text(field(CanonicalField::Category, text(columns.category)));
        let origin = as_text(field(CanonicalField::Origin, text(columns.origin)));
        let destination = as_text(field(CanonicalField::Destination, text(columns.destination)));
        let distance = as_decimal(field(CanonicalField::Distance, text(columns.distance)));
        let purpose = match as_text(field(CanonicalField::Purpose, text(columns.purpose))) {
            Some(p) => p,
            None => {
                report.purpose_filled += 1;
                mapping.purpose_fill.clone()
            }
        };

        trips.push(Trip {
            source: record.clone(),
            start,
            end,
            category,
            origin,
            destination,
            distance,
            purpose,
        });
    }

    for (field, count) in &report.coercion_warnings {
        warn!(field = field.name(), count, "Cells coerced to missing");
    }
    info!(
        rows = trips.len(),
        purpose_filled = report.purpose_filled,
        "Rows normalized"
    );

    Ok((trips, report))
}

fn as_timestamp(value: CellValue) -> Option<NaiveDateTime> {
    match value {
        CellValue::Timestamp(ts) => Some(ts),
        _ => None,
    }
}

fn as_decimal(value: CellValue) -> Option<f64> {
    match value {
        CellValue::Decimal(v) => Some(v),
        _ => None,
    }
}

fn as_text(value: CellValue) -> Option<String> {
    match value {
        CellValue::Text(s) => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use chrono::NaiveDate;

    const HEADER: &[&str] = &[
        "Date",
        "Time",
        "Booking ID",
        "Booking Status",
        "Vehicle Type",
        "Pickup Location",
        "Drop Location",
        "Ride Distance",
    ];

    fn table(rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: StringRecord::from(HEADER.to_vec()),
            records: rows.iter().map(|r| StringRecord::from(r.to_vec())).collect(),
        }
    }

    fn run(table: &RawTable) -> (Vec<Trip>, NormalizeReport) {
        let config = AnalysisConfig::default();
        normalize(
            table,
            &config.mapping,
            &config.timestamp_formats,
            Path::new("rides.csv"),
        )
        .unwrap()
    }

    #[test]
    fn test_maps_reference_columns() {
        let t = table(&[&[
            "2024-03-23",
            "12:29:38",
            "CNR1",
            "Completed",
            "eBike",
            "Palam Vihar",
            "Jhilmil",
            "25.5",
        ]]);
        let (trips, report) = run(&t);
        let trip = &trips[0];

        let expected = NaiveDate::from_ymd_opt(2024, 3, 23)
            .unwrap()
            .and_hms_opt(12, 29, 38)
            .unwrap();
        assert_eq!(trip.start, Some(expected));
        assert_eq!(trip.end, trip.start);
        assert_eq!(trip.category.as_deref(), Some("eBike"));
        assert_eq!(trip.origin.as_deref(), Some("Palam Vihar"));
        assert_eq!(trip.destination.as_deref(), Some("Jhilmil"));
        assert_eq!(trip.distance, Some(25.5));
        assert_eq!(trip.purpose, "Completed");
        assert!(report.coercion_warnings.is_empty());
    }

    #[test]
    fn test_bad_cells_become_missing() {
        let t = table(&[
            &["2024-03-23", "25:99:00", "a", "", "Auto", "X", "Y", "far"],
            &["", "10:00:00", "b", "null", "Auto", "X", "Y", "null"],
        ]);
        let (trips, report) = run(&t);

        assert_eq!(trips[0].start, None);
        assert_eq!(trips[0].distance, None);
        assert_eq!(trips[0].purpose, "NOT");
        assert_eq!(trips[1].start, None);
        assert_eq!(trips[1].purpose, "NOT");

        // Only text that failed to parse is a warning; missing cells are not.
        assert_eq!(report.warnings_for(CanonicalField::StartTimestamp), 1);
        assert_eq!(report.warnings_for(CanonicalField::Distance), 1);
        assert_eq!(report.purpose_filled, 2);
    }

    #[test]
    fn test_missing_column_is_load_error() {
        let t = RawTable {
            headers: StringRecord::from(vec!["Date", "Time"]),
            records: vec![],
        };
        let config = AnalysisConfig::default();
        let err = normalize(
            &t,
            &config.mapping,
            &config.timestamp_formats,
            Path::new("rides.csv"),
        )
        .unwrap_err();
        assert!(err.is_load_error());
    }

    #[test]
    fn test_coerce_decimal_rejects_non_finite() {
        assert_eq!(coerce(FieldKind::Decimal, Some("inf"), &[]), Coerced::Rejected);
        assert_eq!(
            coerce(FieldKind::Decimal, Some("-5"), &[]),
            Coerced::Value(CellValue::Decimal(-5.0))
        );
        assert_eq!(coerce(FieldKind::Decimal, None, &[]), Coerced::Absent);
    }

    #[test]
    fn test_coerce_timestamp_tries_formats_in_order() {
        let formats = AnalysisConfig::default().timestamp_formats;
        let parsed = coerce(FieldKind::Timestamp, Some("23/03/2024 07:05"), &formats);
        let expected = NaiveDate::from_ymd_opt(2024, 3, 23)
            .unwrap()
            .and_hms_opt(7, 5, 0)
            .unwrap();
        assert_eq!(parsed, Coerced::Value(CellValue::Timestamp(expected)));
    }
}
