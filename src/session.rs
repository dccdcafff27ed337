//! Submission boundary: validation, payload, backend call and decode for
//! one trip slot, folded into a single outcome.
//!
//! A slot accepts one submission at a time. A second call while the first
//! is pending is refused instead of racing it, so a stale response can never
//! replace a newer one.

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, instrument, warn};

use crate::decoder::decode_response;
use crate::error::SimulationError;
use crate::payload::{build_comparison_payload, build_single_payload};
use crate::results::{SimulationResults, TripInputs};
use crate::services::emissions_api::EmissionsApi;
use crate::validation::{TripForm, ValidationError, validate};

#[derive(Debug)]
pub enum SubmissionOutcome {
    Completed(SimulationResults),
    Invalid(ValidationError),
    Failed(SimulationError),
    /// Another submission for this slot is still pending.
    InFlight,
}

/// What the user is shown after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserState {
    Ready,
    FixForm,
    RetryLater,
    Busy,
}

impl SubmissionOutcome {
    pub fn user_state(&self) -> UserState {
        match self {
            SubmissionOutcome::Completed(_) => UserState::Ready,
            SubmissionOutcome::Invalid(_) => UserState::FixForm,
            SubmissionOutcome::Failed(_) => UserState::RetryLater,
            SubmissionOutcome::InFlight => UserState::Busy,
        }
    }

    pub fn results(&self) -> Option<&SimulationResults> {
        match self {
            SubmissionOutcome::Completed(results) => Some(results),
            _ => None,
        }
    }
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct TripSession<A> {
    api: A,
    in_flight: AtomicBool,
}

impl<A: EmissionsApi> TripSession<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validates and submits `inputs`. `main_trip` is the reference trip.
    #[instrument(skip_all, fields(
        main_steps = inputs.main_trip.len(),
        comparison = inputs.alternative_trip.is_some(),
    ))]
    pub async fn submit(&self, inputs: TripInputs) -> SubmissionOutcome {
        if let Err(e) = validate(&inputs.main_trip, TripForm::First) {
            info!(advice = %e.advice_key(), "Main trip is incomplete");
            return SubmissionOutcome::Invalid(e);
        }
        if let Some(alternative) = &inputs.alternative_trip {
            if let Err(e) = validate(alternative, TripForm::Second) {
                info!(advice = %e.advice_key(), "Alternative trip is incomplete");
                return SubmissionOutcome::Invalid(e);
            }
        }

        if self.in_flight.swap(true, Ordering::AcqRel) {
            warn!("Submission refused, another one is in flight");
            return SubmissionOutcome::InFlight;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let payload = match &inputs.alternative_trip {
            None => build_single_payload(&inputs.main_trip),
            Some(alternative) => build_comparison_payload(&inputs.main_trip, alternative),
        };

        let result = match self.api.simulate(&payload).await {
            Ok(response) => decode_response(response, inputs),
            Err(e) => Err(e),
        };

        match result {
            Ok(results) => {
                info!(
                    trips = results.trips.len(),
                    geometries = results.trip_geometries.len(),
                    simulation_type = results.simulation_type.as_str(),
                    "Simulation completed"
                );
                SubmissionOutcome::Completed(results)
            }
            Err(e) if e.is_application_error() => {
                info!(error = %e, "Backend rejected the trip");
                SubmissionOutcome::Failed(e)
            }
            Err(e) => {
                error!(error = ?e, "Simulation failed");
                SubmissionOutcome::Failed(e)
            }
        }
    }
}
