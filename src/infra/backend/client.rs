use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, instrument, warn};

use crate::decoder::BackendResponse;
use crate::error::SimulationError;
use crate::fetch::{HttpClient, post_multipart};
use crate::payload::Payload;
use crate::services::emissions_api::EmissionsApi;

/// [`EmissionsApi`] over HTTP: the payload goes out as multipart text
/// fields, the response comes back as JSON.
pub struct EmissionsBackend<C> {
    client: C,
    endpoint: Url,
}

impl<C: HttpClient> EmissionsBackend<C> {
    pub fn new(client: C, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl<C: HttpClient> EmissionsApi for EmissionsBackend<C> {
    #[instrument(skip_all, fields(mode = payload.mode.as_str()))]
    async fn simulate(&self, payload: &Payload) -> Result<BackendResponse, SimulationError> {
        let fields = payload.form_fields().map_err(SimulationError::Payload)?;

        let response = post_multipart(&self.client, self.endpoint.clone(), fields).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Emissions backend returned an error status");
            return Err(SimulationError::Http {
                status: status.as_u16(),
                body,
            });
        }

        debug!(endpoint = %self.endpoint, bytes = body.len(), "Emissions response received");
        Ok(BackendResponse::from_json(&body)?)
    }
}
