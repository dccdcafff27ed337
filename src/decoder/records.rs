//! Emission-line records and how they fold into trips.

use serde::Deserialize;
use tracing::warn;

use crate::error::DecodeError;
use crate::results::{EmissionPart, Trip, TripStep};
use crate::step::TransportMean;

/// One row of a backend trip table: a single emission source of a single
/// leg.
#[derive(Debug, Clone, Deserialize)]
pub struct EmissionRecord {
    #[serde(rename = "Mean of Transport")]
    pub mean_of_transport: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "kgCO2eq")]
    pub kg_co2_eq: f64,
    pub colors: String,
    #[serde(default)]
    pub step: Option<f64>,
}

impl EmissionRecord {
    fn part(&self) -> EmissionPart {
        EmissionPart {
            emissions: self.kg_co2_eq,
            emission_source: self.name.clone(),
            color: self.colors.clone(),
        }
    }
}

/// Keyword rules for mapping a backend designation to a mode. Evaluated in
/// order; "eCar" must precede "Car".
static TRANSPORT_KEYWORDS: &[(&str, TransportMean)] = &[
    ("Train", TransportMean::Train),
    ("Plane", TransportMean::Plane),
    ("eCar", TransportMean::ECar),
    ("Car", TransportMean::Car),
    ("Bus", TransportMean::Bus),
    ("Ferry", TransportMean::Ferry),
    ("Bicycle", TransportMean::Bicycle),
    ("Sail", TransportMean::Sail),
];

fn match_keyword(text: &str) -> Option<TransportMean> {
    TRANSPORT_KEYWORDS
        .iter()
        .find(|(keyword, _)| text.contains(*keyword))
        .map(|(_, mode)| *mode)
}

/// Infers the mode of a record from `NAME`, then from `Mean of Transport`.
pub fn infer_transport(record: &EmissionRecord) -> Option<TransportMean> {
    let mode = match_keyword(&record.name).or_else(|| match_keyword(&record.mean_of_transport));
    if mode.is_none() {
        warn!(
            name = %record.name,
            mean_of_transport = %record.mean_of_transport,
            "Could not resolve transport means for emission record"
        );
    }
    mode
}

/// Parses a JSON-encoded record table.
pub fn parse_records(field: &'static str, raw: &str) -> Result<Vec<EmissionRecord>, DecodeError> {
    serde_json::from_str(raw).map_err(|source| DecodeError::InvalidJson { field, source })
}

fn total(steps: &[TripStep]) -> f64 {
    steps.iter().map(|s| s.emissions).sum()
}

/// Folds a multi-leg record table into one trip.
///
/// Consecutive records sharing a `step` value form one leg; each record
/// contributes one emission part. The first record's `Mean of Transport`
/// labels the trip; an empty table yields an empty trip labelled
/// `default_label`.
pub fn group_multi_step(
    field: &'static str,
    records: &[EmissionRecord],
    default_label: &str,
    is_main_trip: bool,
) -> Result<Trip, DecodeError> {
    let mut steps: Vec<TripStep> = Vec::new();
    let mut current_step: Option<f64> = None;

    for (i, record) in records.iter().enumerate() {
        let step = record
            .step
            .ok_or(DecodeError::MissingStep { field, record: i })?;

        if current_step == Some(step) {
            if let Some(last) = steps.last_mut() {
                last.emissions += record.kg_co2_eq;
                last.emission_parts.push(record.part());
                continue;
            }
        }

        steps.push(TripStep {
            transport_means: infer_transport(record),
            emissions: record.kg_co2_eq,
            emission_parts: vec![record.part()],
        });
        current_step = Some(step);
    }

    let label = records
        .first()
        .map(|r| r.mean_of_transport.clone())
        .unwrap_or_else(|| default_label.to_string());

    Ok(Trip {
        label,
        total_emissions: total(&steps),
        steps,
        is_main_trip,
    })
}

/// Groups a flat "versus other means" table by `Mean of Transport`, one
/// single-leg trip per mode, in order of first appearance.
pub fn group_direct_trips(records: &[EmissionRecord]) -> Vec<Trip> {
    let mut groups: Vec<(&str, TripStep)> = Vec::new();

    for record in records {
        let mean = record.mean_of_transport.as_str();
        match groups.iter().position(|(m, _)| *m == mean) {
            Some(i) => {
                let step = &mut groups[i].1;
                step.emissions += record.kg_co2_eq;
                step.emission_parts.push(record.part());
            }
            None => groups.push((
                mean,
                TripStep {
                    transport_means: infer_transport(record),
                    emissions: record.kg_co2_eq,
                    emission_parts: vec![record.part()],
                },
            )),
        }
    }

    groups
        .into_iter()
        .map(|(mean, step)| Trip {
            label: format!("Direct trip {mean}"),
            total_emissions: step.emissions,
            steps: vec![step],
            is_main_trip: false,
        })
        .collect()
}
