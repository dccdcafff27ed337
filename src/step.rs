//! Trip legs and the predicates that decide whether a trip can be submitted.
//!
//! A trip is an ordered `Vec<Step>`. Position in the vector is the only
//! identity that travels through the payload and the shareable link; the
//! `index` field is regenerated from it whenever a list is rebuilt.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport mode used to travel *into* a step from the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMean {
    Plane,
    Train,
    Car,
    #[serde(rename = "ecar")]
    ECar,
    Bus,
    Ferry,
    Bicycle,
    Sail,
}

impl TransportMean {
    pub const ALL: [TransportMean; 8] = [
        TransportMean::Plane,
        TransportMean::Train,
        TransportMean::Car,
        TransportMean::ECar,
        TransportMean::Bus,
        TransportMean::Ferry,
        TransportMean::Bicycle,
        TransportMean::Sail,
    ];

    /// Wire name, as sent in the `transp` map and in shareable links.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMean::Plane => "plane",
            TransportMean::Train => "train",
            TransportMean::Car => "car",
            TransportMean::ECar => "ecar",
            TransportMean::Bus => "bus",
            TransportMean::Ferry => "ferry",
            TransportMean::Bicycle => "bicycle",
            TransportMean::Sail => "sail",
        }
    }
}

impl fmt::Display for TransportMean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True for modes whose step carries a passenger count.
pub fn uses_passenger_count(mode: TransportMean) -> bool {
    matches!(mode, TransportMean::Car | TransportMean::ECar)
}

/// True for modes whose step carries a cabin/vehicle option string.
pub fn uses_ferry_options(mode: TransportMean) -> bool {
    matches!(mode, TransportMean::Ferry)
}

/// Latitude/longitude pair. Serialized as `[lat, lon]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lon: f64,
}

impl Coords {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(c: Coords) -> Self {
        [c.lat, c.lon]
    }
}

/// Sentinel used on the wire for a hitchhiked car leg.
pub const HITCHHIKING: &str = "hitchhiking";

/// Maximum passenger count selectable for a car leg.
pub const MAX_PASSENGERS: u8 = 5;

/// Number of people sharing a car leg, or the hitchhiking sentinel.
///
/// Serialized as a bare number (`1..=5`) or the string `"hitchhiking"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PassengersRepr", into = "PassengersRepr")]
pub enum Passengers {
    Count(u8),
    Hitchhiking,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum PassengersRepr {
    Count(u8),
    Label(String),
}

impl TryFrom<PassengersRepr> for Passengers {
    type Error = String;

    fn try_from(repr: PassengersRepr) -> Result<Self, Self::Error> {
        match repr {
            PassengersRepr::Count(n) if (1..=MAX_PASSENGERS).contains(&n) => {
                Ok(Passengers::Count(n))
            }
            PassengersRepr::Count(n) => Err(format!(
                "passenger count {n} outside 1..={MAX_PASSENGERS}"
            )),
            PassengersRepr::Label(s) if s == HITCHHIKING => Ok(Passengers::Hitchhiking),
            PassengersRepr::Label(s) => Err(format!("unknown passenger value '{s}'")),
        }
    }
}

impl From<Passengers> for PassengersRepr {
    fn from(p: Passengers) -> Self {
        match p {
            Passengers::Count(n) => PassengersRepr::Count(n),
            Passengers::Hitchhiking => PassengersRepr::Label(HITCHHIKING.to_string()),
        }
    }
}

/// One point of a trip, with the mode used to arrive there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// 1-based position. Position 1 is the origin.
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub location_coords: Option<Coords>,
    #[serde(default)]
    pub transport_mean: Option<TransportMean>,
    #[serde(default)]
    pub passengers: Option<Passengers>,
    #[serde(default)]
    pub options: Option<String>,
}

impl Step {
    /// An empty step at the given 1-based position.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            location_name: None,
            location_coords: None,
            transport_mean: None,
            passengers: None,
            options: None,
        }
    }

    pub fn with_location(mut self, name: impl Into<String>, coords: Coords) -> Self {
        self.location_name = Some(name.into());
        self.location_coords = Some(coords);
        self
    }

    pub fn with_transport(mut self, mode: TransportMean) -> Self {
        self.transport_mean = Some(mode);
        self
    }

    pub fn with_passengers(mut self, passengers: Passengers) -> Self {
        self.passengers = Some(passengers);
        self
    }

    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    /// Passenger count if the step's mode uses one.
    pub fn effective_passengers(&self) -> Option<Passengers> {
        match self.transport_mean {
            Some(mode) if uses_passenger_count(mode) => self.passengers,
            _ => None,
        }
    }

    /// Ferry options if the step's mode uses them.
    pub fn effective_options(&self) -> Option<&str> {
        match self.transport_mean {
            Some(mode) if uses_ferry_options(mode) => self.options.as_deref(),
            _ => None,
        }
    }
}

/// True when `steps` describes a submittable trip: at least two steps, every
/// step located, and every step after the origin reached by some mode.
pub fn is_complete(steps: &[Step]) -> bool {
    steps.len() >= 2
        && steps.iter().all(|s| s.location_coords.is_some())
        && steps.iter().skip(1).all(|s| s.transport_mean.is_some())
}

/// Rewrites every `index` from the step's position, starting at 1.
pub fn reindex(steps: &mut [Step]) {
    for (i, step) in steps.iter_mut().enumerate() {
        step.index = i + 1;
    }
}
