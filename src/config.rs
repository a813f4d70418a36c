//! Run configuration.
//!
//! [`AnalysisConfig`] is built once by the binary (JSON file, then CLI/env
//! overrides) and passed by reference into [`crate::pipeline::run`].
//!
//! Stored as a JSON object on disk; every key is optional:
//! ```json
//! {
//!   "input_path": "bangalore_ride_data.csv",
//!   "output_dir": "bangalore_analysis_output",
//!   "sample_seed": 1,
//!   "top_n": 15,
//!   "mapping": { "distance": "Ride Distance" }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub sample_seed: u64,
    pub sample_size: usize,
    pub top_n: usize,
    pub histogram_bins: usize,
    pub moving_average_window: usize,
    pub report_top_purposes: usize,
    pub report_title: String,
    /// Tried in order against the combined `"<date> <time>"` string.
    pub timestamp_formats: Vec<String>,
    pub mapping: FieldMapping,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("bangalore_ride_data.csv"),
            output_dir: PathBuf::from("bangalore_analysis_output"),
            sample_seed: 1,
            sample_size: 2000,
            top_n: 15,
            histogram_bins: 30,
            moving_average_window: 7,
            report_top_purposes: 5,
            report_title: "Bangalore Rides - Analysis Summary".to_string(),
            timestamp_formats: default_timestamp_formats(),
            mapping: FieldMapping::default(),
        }
    }
}

impl AnalysisConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: AnalysisConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}

/// Source column names for each canonical field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    /// Joined with a single space before timestamp parsing.
    pub start_columns: Vec<String>,
    /// `None` copies the start timestamp, giving every trip a zero duration.
    pub end_columns: Option<Vec<String>>,
    pub category: String,
    pub origin: String,
    pub destination: String,
    pub distance: String,
    pub purpose: String,
    pub purpose_fill: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            start_columns: vec!["Date".to_string(), "Time".to_string()],
            end_columns: None,
            category: "Vehicle Type".to_string(),
            origin: "Pickup Location".to_string(),
            destination: "Drop Location".to_string(),
            distance: "Ride Distance".to_string(),
            purpose: "Booking Status".to_string(),
            purpose_fill: "NOT".to_string(),
        }
    }
}

fn default_timestamp_formats() -> Vec<String> {
    [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%d-%m-%Y %H:%M:%S",
        "%d-%m-%Y %H:%M",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
    ]
    .iter()
    .map(|f| f.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_reference_dataset() {
        let config = AnalysisConfig::default();
        assert_eq!(config.sample_seed, 1);
        assert_eq!(config.sample_size, 2000);
        assert_eq!(config.top_n, 15);
        assert_eq!(config.mapping.start_columns, vec!["Date", "Time"]);
        assert!(config.mapping.end_columns.is_none());
        assert_eq!(config.mapping.purpose_fill, "NOT");
    }

    #[test]
    fn test_load_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "top_n": 5, "mapping": {{ "distance": "Km" }} }}"#
        )
        .unwrap();

        let config = AnalysisConfig::load(file.path()).unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.mapping.distance, "Km");
        assert_eq!(config.mapping.origin, "Pickup Location");
        assert_eq!(config.histogram_bins, 30);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(AnalysisConfig::load("/nonexistent/ride_report.json").is_err());
    }
}
