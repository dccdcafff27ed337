//! Output formatting and persistence for simulation results.
//!
//! Supports pretty-printing, JSON serialization, and CSV append of one
//! summary row per trip.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{debug, info};

use crate::results::SimulationResults;

/// One CSV row: the headline numbers of a decoded trip.
#[derive(Debug, Serialize)]
pub struct TripSummary {
    pub timestamp: DateTime<Utc>,
    pub simulation_type: &'static str,
    pub label: String,
    pub is_main_trip: bool,
    pub steps: usize,
    pub total_emissions: f64,
}

impl TripSummary {
    pub fn from_results(results: &SimulationResults) -> Vec<Self> {
        let timestamp = Utc::now();
        results
            .trips
            .iter()
            .map(|trip| TripSummary {
                timestamp,
                simulation_type: results.simulation_type.as_str(),
                label: trip.label.clone(),
                is_main_trip: trip.is_main_trip,
                steps: trip.steps.len(),
                total_emissions: trip.total_emissions,
            })
            .collect()
    }
}

/// Logs results using Rust's debug pretty-print format.
pub fn print_pretty(results: &SimulationResults) {
    debug!("{:#?}", results);
}

/// Logs results as pretty-printed JSON.
pub fn print_json(results: &SimulationResults) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(results)?);
    Ok(())
}

/// Appends one [`TripSummary`] row per trip to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_summary(path: &str, results: &SimulationResults) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV summary");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    for row in TripSummary::from_results(results) {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
