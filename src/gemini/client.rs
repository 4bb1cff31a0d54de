use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::error::GeminiError;
use super::types::{ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

pub const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-image-preview";

/// Anything that can answer a `generateContent` request.
pub trait ContentGenerator: Send + Sync + 'static {
    fn generate_content(
        &self,
        req: &GenerateContentRequest,
    ) -> impl Future<Output = Result<GenerateContentResponse, GeminiError>> + Send;
}

pub struct GeminiClient {
    api_key: String,
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a client for `model` under `base_url` (see [`API_BASE_URL`]).
    ///
    /// No overall request timeout is set here; the retry controller owns the
    /// per-attempt deadline.
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Result<Self, GeminiError> {
        let client = Client::builder().connect_timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            api_key,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl ContentGenerator for GeminiClient {
    async fn generate_content(
        &self,
        req: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        debug!(model = %self.model, "sending generateContent request");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(req)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let (message, status_text) = match serde_json::from_str::<ApiErrorEnvelope>(&body) {
                Ok(env) => (env.error.message, env.error.status),
                Err(_) => (body, None),
            };
            return Err(GeminiError::Api {
                status: status.as_u16(),
                status_text,
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
