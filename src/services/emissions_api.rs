//! The "submit trip" capability the pipeline depends on.

use crate::decoder::BackendResponse;
use crate::error::SimulationError;
use crate::payload::Payload;

/// Abstraction over an emissions computation backend.
#[async_trait::async_trait]
pub trait EmissionsApi: Send + Sync {
    /// Sends one payload and returns the raw, undecoded response.
    ///
    /// Transport failures and non-success statuses are errors here; a
    /// backend-reported `error` field is not, it travels inside the
    /// response.
    async fn simulate(&self, payload: &Payload) -> Result<BackendResponse, SimulationError>;
}
