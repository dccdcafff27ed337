use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::sync::Mutex;
use tokio::sync::Notify;
use trip_emissions::decoder::{BackendResponse, decode_response};
use trip_emissions::error::{DecodeError, SimulationError};
use trip_emissions::payload::{Payload, PayloadMode};
use trip_emissions::results::{SimulationType, TripInputs};
use trip_emissions::services::emissions_api::EmissionsApi;
use trip_emissions::session::{SubmissionOutcome, TripSession, UserState};
use trip_emissions::share::{decode_share_link, share_url};
use trip_emissions::step::{Coords, Passengers, Step, TransportMean};

fn train_trip() -> Vec<Step> {
    vec![
        Step::new(1).with_location("Paris", Coords::new(48.8566, 2.3522)),
        Step::new(2)
            .with_location("Lyon", Coords::new(45.764, 4.8357))
            .with_transport(TransportMean::Train),
    ]
}

fn car_trip() -> Vec<Step> {
    vec![
        Step::new(1).with_location("Paris", Coords::new(48.8566, 2.3522)),
        Step::new(2)
            .with_location("Dijon", Coords::new(47.322, 5.0415))
            .with_transport(TransportMean::Car)
            .with_passengers(Passengers::Count(2)),
        Step::new(3)
            .with_location("Lyon", Coords::new(45.764, 4.8357))
            .with_transport(TransportMean::Bus),
    ]
}

fn main_trip_records() -> String {
    json!([{"Mean of Transport":"Train","NAME":"Train","kgCO2eq":12.5,"colors":"#1f77b4","step":1}])
        .to_string()
}

fn gdf() -> serde_json::Value {
    json!({ "features": [{
        "properties": { "label": "Train", "length": 465.3, "colors": "#1f77b4" },
        "geometry": { "coordinates": [[2.3522, 48.8566], [4.8357, 45.764]] }
    }]})
}

#[test]
fn test_main_trip_only_scenario() {
    let response = BackendResponse {
        my_trip: Some(main_trip_records()),
        gdf: Some(gdf()),
        ..Default::default()
    };
    let results = decode_response(response, TripInputs::default()).unwrap();

    assert_eq!(results.simulation_type, SimulationType::MainTripOnly);
    assert_eq!(results.trips.len(), 1);
    let trip = &results.trips[0];
    assert!(trip.is_main_trip);
    assert_eq!(trip.total_emissions, 12.5);
    assert_eq!(trip.steps.len(), 1);
    assert_eq!(trip.steps[0].transport_means, Some(TransportMean::Train));
    assert_eq!(results.trip_geometries.len(), 1);
    assert_eq!(results.trip_geometries[0].length, 465.0);
}

#[test]
fn test_direct_trip_scenario() {
    let direct = json!([
        {"Mean of Transport":"Plane","NAME":"Plane","kgCO2eq":95.0,"colors":"#ff7f0e"},
        {"Mean of Transport":"Bus","NAME":"Bus","kgCO2eq":14.0,"colors":"#2ca02c"}
    ])
    .to_string();
    let response = BackendResponse {
        my_trip: Some(main_trip_records()),
        direct_trip: Some(direct),
        gdf: Some(gdf()),
        ..Default::default()
    };
    let results = decode_response(response, TripInputs::default()).unwrap();

    assert_eq!(
        results.simulation_type,
        SimulationType::MainTripVsOtherTransportMeans
    );
    assert_eq!(results.trips.len(), 3);
    assert_eq!(results.trips[1].label, "Direct trip Plane");
    assert_eq!(results.trips[2].label, "Direct trip Bus");
    assert_eq!(
        results.trips[2].steps[0].transport_means,
        Some(TransportMean::Bus)
    );
}

#[test]
fn test_malformed_main_trip_is_decode_error() {
    let response = BackendResponse {
        my_trip: Some("[{\"Mean of Transport\": ".to_string()),
        gdf: Some(gdf()),
        ..Default::default()
    };
    assert!(matches!(
        decode_response(response, TripInputs::default()),
        Err(SimulationError::Decode(DecodeError::InvalidJson {
            field: "my_trip",
            ..
        }))
    ));
}

/// In-memory backend recording every payload it receives.
struct FakeBackend {
    response: BackendResponse,
    payloads: Mutex<Vec<Payload>>,
    gate: Option<Arc<Notify>>,
}

impl FakeBackend {
    fn new(response: BackendResponse) -> Self {
        Self {
            response,
            payloads: Mutex::new(Vec::new()),
            gate: None,
        }
    }
}

#[async_trait]
impl EmissionsApi for FakeBackend {
    async fn simulate(&self, payload: &Payload) -> Result<BackendResponse, SimulationError> {
        self.payloads.lock().unwrap().push(payload.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(self.response.clone())
    }
}

fn ok_response() -> BackendResponse {
    BackendResponse {
        my_trip: Some(main_trip_records()),
        gdf: Some(gdf()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_session_submits_single_trip() {
    let session = TripSession::new(FakeBackend::new(ok_response()));
    let inputs = TripInputs {
        main_trip: train_trip(),
        alternative_trip: None,
    };

    let outcome = session.submit(inputs.clone()).await;
    assert_eq!(outcome.user_state(), UserState::Ready);
    let results = outcome.results().unwrap();
    assert_eq!(results.inputs, inputs);
    assert!(!session.is_submitting());
}

#[tokio::test]
async fn test_session_completes_comparison() {
    let backend = FakeBackend::new(ok_response());
    let session = TripSession::new(backend);
    let inputs = TripInputs {
        main_trip: train_trip(),
        alternative_trip: Some(car_trip()),
    };

    let outcome = session.submit(inputs).await;
    assert!(matches!(outcome, SubmissionOutcome::Completed(_)));
}

#[tokio::test]
async fn test_session_rejects_incomplete_trip_without_calling_backend() {
    let mut steps = train_trip();
    steps[1].transport_mean = None;
    let backend = Arc::new(FakeBackend::new(ok_response()));
    let session = TripSession::new(SharedBackend(backend.clone()));

    let outcome = session
        .submit(TripInputs {
            main_trip: steps,
            alternative_trip: None,
        })
        .await;

    match outcome {
        SubmissionOutcome::Invalid(e) => {
            assert_eq!(e.missing_modes, vec![2]);
            assert_eq!(e.advice_key(), "advice.missing_modes.singular.first");
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert!(backend.payloads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_session_payload_order_for_comparison() {
    let backend = Arc::new(FakeBackend::new(ok_response()));
    let session = TripSession::new(SharedBackend(backend.clone()));

    session
        .submit(TripInputs {
            main_trip: train_trip(),
            alternative_trip: Some(car_trip()),
        })
        .await;

    let payloads = backend.payloads.lock().unwrap();
    assert_eq!(payloads.len(), 1);
    let payload = &payloads[0];
    assert_eq!(payload.mode, PayloadMode::Comparison);
    assert_eq!(payload.my_trip.lat.len(), 2);
    let alternative = payload.alternative_trip.as_ref().unwrap();
    assert_eq!(alternative.lat.len(), 3);
    assert_eq!(alternative.nb["1"], Passengers::Count(2));
}

#[tokio::test]
async fn test_backend_error_becomes_retry_state() {
    let response = BackendResponse {
        error: Some("Unable to find a route".to_string()),
        ..Default::default()
    };
    let session = TripSession::new(FakeBackend::new(response));
    let outcome = session
        .submit(TripInputs {
            main_trip: train_trip(),
            alternative_trip: None,
        })
        .await;

    assert_eq!(outcome.user_state(), UserState::RetryLater);
    match outcome {
        SubmissionOutcome::Failed(SimulationError::Backend(msg)) => {
            assert_eq!(msg, "Unable to find a route")
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_second_submission_while_in_flight_is_refused() {
    let gate = Arc::new(Notify::new());
    let mut backend = FakeBackend::new(ok_response());
    backend.gate = Some(gate.clone());
    let session = TripSession::new(backend);
    let inputs = TripInputs {
        main_trip: train_trip(),
        alternative_trip: None,
    };

    let (first, second) = tokio::join!(session.submit(inputs.clone()), async {
        let outcome = session.submit(inputs.clone()).await;
        gate.notify_one();
        outcome
    });

    assert!(matches!(first, SubmissionOutcome::Completed(_)));
    assert!(matches!(second, SubmissionOutcome::InFlight));
    assert_eq!(second.user_state(), UserState::Busy);
    assert!(!session.is_submitting());
}

#[tokio::test]
async fn test_shared_link_replays_through_session() {
    let base = reqwest::Url::parse("https://trips.example.org/").unwrap();
    let url = share_url(&base, &car_trip(), None).unwrap();

    let shared = decode_share_link(url.as_str()).unwrap();
    let inputs = shared.auto_submission().unwrap();
    assert_eq!(inputs.main_trip[1].passengers, Some(Passengers::Count(2)));

    let backend = Arc::new(FakeBackend::new(ok_response()));
    let session = TripSession::new(SharedBackend(backend.clone()));
    let outcome = session.submit(inputs).await;
    assert!(matches!(outcome, SubmissionOutcome::Completed(_)));

    let payloads = backend.payloads.lock().unwrap();
    assert_eq!(payloads[0].mode, PayloadMode::Single);
    assert_eq!(payloads[0].my_trip.transp["2"], "bus");
}

/// Lets a test keep a handle on the backend after handing it to a session.
struct SharedBackend(Arc<FakeBackend>);

#[async_trait]
impl EmissionsApi for SharedBackend {
    async fn simulate(&self, payload: &Payload) -> Result<BackendResponse, SimulationError> {
        self.0.simulate(payload).await
    }
}
