//! Decoded simulation results, ready to render.

use serde::Serialize;

use crate::step::{Step, TransportMean};

/// One emission source within a leg (fuel, infrastructure, contrails...).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionPart {
    /// kgCO2eq
    pub emissions: f64,
    pub emission_source: String,
    /// Display color, passed through from the backend.
    pub color: String,
}

/// One leg of a decoded trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripStep {
    /// `None` when the backend designation matched no known mode.
    pub transport_means: Option<TransportMean>,
    /// kgCO2eq, the sum of `emission_parts`.
    pub emissions: f64,
    pub emission_parts: Vec<EmissionPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub label: String,
    pub steps: Vec<TripStep>,
    pub total_emissions: f64,
    pub is_main_trip: bool,
}

/// Interpolation values for a composed geometry label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelParams {
    pub length: f64,
    pub country: Option<String>,
}

/// One drawable path on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    /// Display label, or a label key when `label_params` is set.
    pub label: String,
    pub label_params: Option<LabelParams>,
    pub transport_means: String,
    pub color: String,
    /// `[lon, lat]` pairs.
    pub coordinates: Vec<[f64; 2]>,
    /// km, rounded.
    pub length: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SimulationType {
    MainTripOnly,
    MainTripVsOtherTransportMeans,
    MainTripVsOtherTrip,
}

impl SimulationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationType::MainTripOnly => "mainTripOnly",
            SimulationType::MainTripVsOtherTransportMeans => "mainTripVsOtherTransportMeans",
            SimulationType::MainTripVsOtherTrip => "mainTripVsOtherTrip",
        }
    }
}

/// Steps the results were computed from, in logical order: `main_trip` is
/// always the reference trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripInputs {
    pub main_trip: Vec<Step>,
    pub alternative_trip: Option<Vec<Step>>,
}

/// Everything produced by one successful submission. Built once, never
/// mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResults {
    pub trips: Vec<Trip>,
    pub trip_geometries: Vec<Geometry>,
    pub simulation_type: SimulationType,
    pub inputs: TripInputs,
}

impl SimulationResults {
    pub fn main_trip(&self) -> Option<&Trip> {
        self.trips.iter().find(|t| t.is_main_trip)
    }

    pub fn comparison_trips(&self) -> impl Iterator<Item = &Trip> {
        self.trips.iter().filter(|t| !t.is_main_trip)
    }
}
