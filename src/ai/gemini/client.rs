//! Transport for Gemini's `generateContent` REST endpoint.

use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::models::DEFAULT_GEMINI_BASE_URL;
use crate::{Error, Result};
use reqwest::Client;
use std::time::Duration;

pub struct GeminiHttpClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiHttpClient {
    /// Accepts either a bare model ID or the `models/<id>` resource name.
    pub fn new(http: Client, api_key: String, model: &str, timeout: Duration) -> Self {
        Self {
            http,
            api_key,
            model: model.strip_prefix("models/").unwrap_or(model).to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Send one request and decode the reply envelope.
    ///
    /// Transport failures surface as [`Error::Http`]; a non-2xx status or a
    /// body that is not a `generateContent` envelope is [`Error::AiProvider`].
    /// There are no retries.
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint();
        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Could not reach Gemini ({}): {}", self.model, e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("Gemini rejected the request with {}: {}", status, body);
            return Err(Error::AiProvider(format!(
                "Gemini API error (status {}): {}",
                status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Unexpected Gemini reply body ({}): {}", e, body);
            Error::AiProvider(format!("Could not decode Gemini reply: {}", e))
        })
    }
}
