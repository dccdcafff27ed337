//! Turns a backend emissions response into [`SimulationResults`].
//!
//! The response carries up to three JSON-encoded record tables
//! (`my_trip`, `direct_trip`, `alternative_trip`) and a geometry collection.
//! A backend `error` wins over everything else. Any decode failure aborts
//! the whole result.

pub mod geometry;
pub mod records;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{DecodeError, SimulationError};
use crate::results::{SimulationResults, SimulationType, TripInputs};

pub use geometry::{GeometryShape, decode_geometries, probe_shape};
pub use records::{EmissionRecord, group_direct_trips, group_multi_step, infer_transport};

/// Label of a multi-step trip whose record table is empty.
pub const DEFAULT_TRIP_LABEL: &str = "My trip";

/// Raw backend response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendResponse {
    #[serde(default)]
    pub my_trip: Option<String>,
    #[serde(default)]
    pub direct_trip: Option<String>,
    #[serde(default)]
    pub alternative_trip: Option<String>,
    #[serde(default, alias = "geometries")]
    pub gdf: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl BackendResponse {
    /// Parses a response body.
    pub fn from_json(body: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(body).map_err(|source| DecodeError::InvalidJson {
            field: "response",
            source,
        })
    }

    pub fn simulation_type(&self) -> SimulationType {
        if self.alternative_trip.is_some() {
            SimulationType::MainTripVsOtherTrip
        } else if self.direct_trip.is_some() {
            SimulationType::MainTripVsOtherTransportMeans
        } else {
            SimulationType::MainTripOnly
        }
    }
}

/// Decodes a parsed response.
///
/// A backend-reported `error` is returned as [`SimulationError::Backend`]
/// before any other field is looked at.
#[instrument(skip_all)]
pub fn decode_response(
    response: BackendResponse,
    inputs: TripInputs,
) -> Result<SimulationResults, SimulationError> {
    if let Some(message) = response.error {
        return Err(SimulationError::Backend(message));
    }

    let simulation_type = response.simulation_type();

    let my_trip = response
        .my_trip
        .as_deref()
        .ok_or(DecodeError::MissingField("my_trip"))?;
    let records = records::parse_records("my_trip", my_trip)?;
    let mut trips = vec![group_multi_step(
        "my_trip",
        &records,
        DEFAULT_TRIP_LABEL,
        true,
    )?];

    if let Some(raw) = response.alternative_trip.as_deref() {
        let records = records::parse_records("alternative_trip", raw)?;
        trips.push(group_multi_step(
            "alternative_trip",
            &records,
            DEFAULT_TRIP_LABEL,
            false,
        )?);
    } else if let Some(raw) = response.direct_trip.as_deref() {
        let records = records::parse_records("direct_trip", raw)?;
        trips.extend(group_direct_trips(&records));
    }

    let gdf = response.gdf.ok_or(DecodeError::MissingField("gdf"))?;
    let trip_geometries = decode_geometries(gdf)?;

    debug!(
        trips = trips.len(),
        geometries = trip_geometries.len(),
        simulation_type = simulation_type.as_str(),
        "Decoded simulation response"
    );

    Ok(SimulationResults {
        trips,
        trip_geometries,
        simulation_type,
        inputs,
    })
}

/// Parses and decodes a response body in one go.
pub fn decode_response_str(
    body: &str,
    inputs: TripInputs,
) -> Result<SimulationResults, SimulationError> {
    decode_response(BackendResponse::from_json(body)?, inputs)
}
