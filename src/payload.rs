//! Wire payload sent to the emissions backend.
//!
//! Each trip becomes five parallel maps keyed by the step's zero-based
//! position in the list (`"0"`, `"1"`, ...). Nothing is validated here;
//! call [`crate::step::is_complete`] first.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::step::{Passengers, Step};

/// `"1"`: one trip, compared server-side against other transport means.
/// `"2"`: explicit comparison of two trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PayloadMode {
    #[serde(rename = "1")]
    Single,
    #[serde(rename = "2")]
    Comparison,
}

impl PayloadMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadMode::Single => "1",
            PayloadMode::Comparison => "2",
        }
    }
}

/// One trip in wire form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EncodedTrip {
    pub lon: BTreeMap<String, f64>,
    pub lat: BTreeMap<String, f64>,
    pub transp: BTreeMap<String, String>,
    pub nb: BTreeMap<String, Passengers>,
    pub options: BTreeMap<String, String>,
}

impl EncodedTrip {
    pub fn from_steps(steps: &[Step]) -> Self {
        let mut trip = EncodedTrip::default();

        for (i, step) in steps.iter().enumerate() {
            let key = i.to_string();

            // Missing coordinates are left for the backend to reject.
            if let Some(coords) = step.location_coords {
                trip.lon.insert(key.clone(), coords.lon);
                trip.lat.insert(key.clone(), coords.lat);
            }
            if let Some(mode) = step.transport_mean {
                trip.transp.insert(key.clone(), mode.as_str().to_string());
            }
            trip.nb.insert(
                key.clone(),
                step.effective_passengers().unwrap_or(Passengers::Count(1)),
            );
            trip.options.insert(
                key,
                step.effective_options().unwrap_or_default().to_string(),
            );
        }

        trip
    }
}

/// Complete request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    pub mode: PayloadMode,
    #[serde(rename = "my-trip")]
    pub my_trip: EncodedTrip,
    #[serde(rename = "alternative-trip", skip_serializing_if = "Option::is_none")]
    pub alternative_trip: Option<EncodedTrip>,
}

impl Payload {
    /// Multipart field name/value pairs; trips are JSON strings.
    pub fn form_fields(&self) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
        let mut fields = vec![
            ("mode", self.mode.as_str().to_string()),
            ("my-trip", serde_json::to_string(&self.my_trip)?),
        ];
        if let Some(alternative) = &self.alternative_trip {
            fields.push(("alternative-trip", serde_json::to_string(alternative)?));
        }
        Ok(fields)
    }
}

/// Payload for a single trip (mode `"1"`).
pub fn build_single_payload(steps: &[Step]) -> Payload {
    Payload {
        mode: PayloadMode::Single,
        my_trip: EncodedTrip::from_steps(steps),
        alternative_trip: None,
    }
}

/// Payload comparing two trips (mode `"2"`).
///
/// `reference` is sent as `my-trip` and `alternative` as `alternative-trip`.
pub fn build_comparison_payload(reference: &[Step], alternative: &[Step]) -> Payload {
    Payload {
        mode: PayloadMode::Comparison,
        my_trip: EncodedTrip::from_steps(reference),
        alternative_trip: Some(EncodedTrip::from_steps(alternative)),
    }
}

/// Payload from the form's point of view: `primary` is the list being
/// edited, `comparison` the other one.
///
/// In a comparison the *other* list is the reference trip and the list
/// being edited becomes the alternative. This is the only place that swap
/// happens.
pub fn encode_payload(primary: &[Step], comparison: Option<&[Step]>) -> Payload {
    match comparison {
        None => build_single_payload(primary),
        Some(reference) => build_comparison_payload(reference, primary),
    }
}
