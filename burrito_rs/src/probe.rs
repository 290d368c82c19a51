//! Network probing: one sample call per route.

use crate::error::{BurritoError, InferenceError};
use crate::schema::HttpMethod;
use std::time::Duration;
use tracing::debug;

/// Sends sample requests against a live API.
#[derive(Debug, Clone)]
pub struct Prober {
    client: reqwest::Client,
}

impl Prober {
    /// Builds the HTTP client; every request carries `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `BurritoError::HttpClientError` if the client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, BurritoError> {
        let client: reqwest::Client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BurritoError::HttpClientError)?;
        Ok(Self { client })
    }

    /// Requests `url` and returns the body of a success response. POST requests send
    /// `payload` as JSON.
    ///
    /// # Errors
    ///
    /// Returns `InferenceError::Request` if the request fails or times out and
    /// `InferenceError::Status` for a non-success status.
    pub async fn fetch(
        &self,
        url: &str,
        method: HttpMethod,
        payload: Option<&serde_json::Value>,
    ) -> Result<String, InferenceError> {
        debug!(%url, %method, "Sending probe request.");
        let request: reqwest::RequestBuilder = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => match payload {
                Some(payload) => self.client.post(url).json(payload),
                None => self.client.post(url),
            },
        };
        let request_error = |source: reqwest::Error| InferenceError::Request {
            url: url.to_string(),
            source,
        };

        let response: reqwest::Response = request.send().await.map_err(request_error)?;
        let status: reqwest::StatusCode = response.status();
        if !status.is_success() {
            return Err(InferenceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body: String = response.text().await.map_err(request_error)?;
        debug!(%url, status = status.as_u16(), bytes = body.len(), "Probe answered.");
        Ok(body)
    }
}
