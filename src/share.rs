//! Shareable links: one or two trips packed into URL query parameters.
//!
//! Each step becomes a positional JSON array
//! `[name, coords, mode?, extra?]`. Its length (2, 3 or 4) says which
//! optional slots are present; `extra` is the passenger count for car legs
//! and the option string for ferry legs. Step positions are not stored and
//! are regenerated on decode.

use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ShareLinkError;
use crate::results::TripInputs;
use crate::step::{
    Coords, HITCHHIKING, Passengers, Step, TransportMean, is_complete, uses_ferry_options,
    uses_passenger_count,
};

pub const MAIN_TRIP_PARAM: &str = "mainTrip";
pub const ALTERNATIVE_TRIP_PARAM: &str = "alternativeTrip";

fn passengers_value(passengers: Passengers) -> Value {
    match passengers {
        Passengers::Count(n) => Value::from(n),
        Passengers::Hitchhiking => Value::from(HITCHHIKING),
    }
}

fn step_tuple(step: &Step) -> Vec<Value> {
    let mut tuple = vec![
        step.location_name
            .as_deref()
            .map_or(Value::Null, Value::from),
        step.location_coords
            .map_or(Value::Null, |c| Value::from(vec![c.lat, c.lon])),
    ];

    if let Some(mode) = step.transport_mean {
        tuple.push(Value::from(mode.as_str()));
        if let Some(passengers) = step.effective_passengers() {
            tuple.push(passengers_value(passengers));
        } else if let Some(options) = step.effective_options() {
            tuple.push(Value::from(options));
        }
    }

    tuple
}

/// Serializes one step list into its query-parameter value.
pub fn encode_steps(steps: &[Step]) -> Result<String, ShareLinkError> {
    let tuples: Vec<Vec<Value>> = steps.iter().map(step_tuple).collect();
    serde_json::to_string(&tuples).map_err(ShareLinkError::Encode)
}

/// Builds a shareable URL under `base`.
pub fn share_url(
    base: &Url,
    main: &[Step],
    alternative: Option<&[Step]>,
) -> Result<Url, ShareLinkError> {
    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query.append_pair(MAIN_TRIP_PARAM, &encode_steps(main)?);
        if let Some(alternative) = alternative {
            query.append_pair(ALTERNATIVE_TRIP_PARAM, &encode_steps(alternative)?);
        }
    }
    Ok(url)
}

fn invalid(position: usize, message: impl Into<String>) -> ShareLinkError {
    ShareLinkError::InvalidField {
        position,
        message: message.into(),
    }
}

fn decode_tuple(position: usize, value: Value) -> Result<Step, ShareLinkError> {
    let Value::Array(slots) = value else {
        return Err(invalid(position, "step is not an array"));
    };
    if !(2..=4).contains(&slots.len()) {
        return Err(ShareLinkError::BadTupleLength {
            position,
            len: slots.len(),
        });
    }

    let mut slots = slots.into_iter();
    let mut step = Step::new(position);

    step.location_name = match slots.next() {
        Some(Value::String(name)) => Some(name),
        Some(Value::Null) | None => None,
        Some(_) => return Err(invalid(position, "location name is not a string")),
    };

    step.location_coords = match slots.next() {
        Some(Value::Null) | None => None,
        Some(coords) => Some(
            serde_json::from_value::<Coords>(coords)
                .map_err(|e| invalid(position, format!("bad coordinates: {e}")))?,
        ),
    };

    let Some(mode) = slots.next() else {
        return Ok(step);
    };
    let mode: TransportMean = serde_json::from_value(mode)
        .map_err(|e| invalid(position, format!("bad transport: {e}")))?;
    step.transport_mean = Some(mode);

    let Some(extra) = slots.next() else {
        return Ok(step);
    };
    let mismatch = || ShareLinkError::ExtraMismatch {
        position,
        mode: mode.to_string(),
    };
    if uses_passenger_count(mode) {
        step.passengers = Some(serde_json::from_value(extra).map_err(|_| mismatch())?);
    } else if uses_ferry_options(mode) {
        match extra {
            Value::String(options) => step.options = Some(options),
            _ => return Err(mismatch()),
        }
    } else {
        return Err(mismatch());
    }

    Ok(step)
}

/// Rebuilds a step list from a query-parameter value.
pub fn decode_steps(param: &'static str, raw: &str) -> Result<Vec<Step>, ShareLinkError> {
    let tuples: Vec<Value> =
        serde_json::from_str(raw).map_err(|source| ShareLinkError::InvalidJson { param, source })?;

    tuples
        .into_iter()
        .enumerate()
        .map(|(i, tuple)| decode_tuple(i + 1, tuple))
        .collect()
}

/// Trips recovered from a shared link.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedTrips {
    pub main: Vec<Step>,
    pub alternative: Option<Vec<Step>>,
}

impl SharedTrips {
    /// What to submit straight away, if anything.
    ///
    /// Nothing when the main trip is incomplete. An incomplete alternative
    /// stays loaded for editing but is left out of the submission.
    pub fn auto_submission(&self) -> Option<TripInputs> {
        if !is_complete(&self.main) {
            return None;
        }
        let alternative = self
            .alternative
            .as_ref()
            .filter(|steps| is_complete(steps))
            .cloned();
        Some(TripInputs {
            main_trip: self.main.clone(),
            alternative_trip: alternative,
        })
    }
}

/// Decodes a full shared URL.
pub fn decode_share_link(link: &str) -> Result<SharedTrips, ShareLinkError> {
    let url = Url::parse(link).map_err(|e| ShareLinkError::InvalidUrl(e.to_string()))?;

    let mut main = None;
    let mut alternative = None;
    for (key, value) in url.query_pairs() {
        match &*key {
            MAIN_TRIP_PARAM => main = Some(decode_steps(MAIN_TRIP_PARAM, &value)?),
            ALTERNATIVE_TRIP_PARAM => {
                alternative = Some(decode_steps(ALTERNATIVE_TRIP_PARAM, &value)?)
            }
            _ => debug!(param = %key, "Ignoring unknown share link parameter"),
        }
    }

    let main = main.ok_or(ShareLinkError::MissingParameter(MAIN_TRIP_PARAM))?;
    info!(
        main_steps = main.len(),
        alternative_steps = alternative.as_ref().map(Vec::len),
        "Decoded share link"
    );

    Ok(SharedTrips { main, alternative })
}
